//! Read-only view of the monitoring state for the UI layer.

use std::collections::HashMap;

use serde::Serialize;

use crate::geo::GeoRecord;

/// Risk score at or above this value is considered high risk by consumers.
pub const HIGH_RISK_THRESHOLD: f64 = 50.0;

/// Point-in-time copy of the observable monitoring state.
///
/// Each field is coherent on its own; fields updated by different components
/// may be transiently out of step with one another.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub risk_score: f64,
    /// Newest-first.
    pub threat_log: Vec<String>,
    /// Newest-first.
    pub live_feed: Vec<String>,
    /// Oldest-first, always exactly the window length.
    pub pps_history: Vec<u64>,
    pub proto_counts: HashMap<String, u64>,
    pub geo_records: Vec<GeoRecord>,
    pub heartbeat: String,
    pub packet_count: u64,
}

impl MonitorSnapshot {
    pub fn is_high_risk(&self) -> bool {
        self.risk_score >= HIGH_RISK_THRESHOLD
    }

    /// Most recent packets-per-second sample.
    pub fn current_pps(&self) -> u64 {
        self.pps_history.last().copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_risk_starts_at_threshold() {
        let snap = MonitorSnapshot {
            risk_score: 50.0,
            threat_log: Vec::new(),
            live_feed: Vec::new(),
            pps_history: vec![0; 30],
            proto_counts: HashMap::new(),
            geo_records: Vec::new(),
            heartbeat: "12:00:00".into(),
            packet_count: 0,
        };
        assert!(snap.is_high_risk());
    }
}
