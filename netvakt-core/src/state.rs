//! The shared monitoring aggregate.
//!
//! One `MonitorState` is created at startup and shared by every background
//! unit. Each container sits behind its own `parking_lot` lock and each
//! counter/flag is an atomic, so no single operation can block an unrelated
//! one. Locks are held only for the duration of one container operation.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::bounded::{BoundedLog, SlidingWindow};
use crate::geo::{GeoRecord, GeoTable};
use crate::snapshot::MonitorSnapshot;

/// Hard capacity of the threat log.
pub const THREAT_LOG_CAPACITY: usize = 15;

/// Number of per-second samples kept in the rate history.
pub const PPS_WINDOW: usize = 30;

/// Risk score ceiling; scores are clamped into `[0, RISK_CEILING]`.
pub const RISK_CEILING: f64 = 100.0;

/// What `reset_stats` does to the monotonic counters.
///
/// The risk score, threat log, and geolocation table are always cleared;
/// deployments differ on whether the packet counter and per-protocol counts
/// should survive a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPolicy {
    /// Counters keep accumulating across resets (the default).
    #[default]
    KeepCounters,
    /// Counters are zeroed together with the rest of the statistics.
    ClearCounters,
}

/// Construction parameters for [`MonitorState`].
#[derive(Debug, Clone)]
pub struct StateOptions {
    pub live_feed_capacity: usize,
    pub sensitivity: f64,
    pub interface: String,
    pub map_all_traffic: bool,
    pub reset_policy: ResetPolicy,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            live_feed_capacity: 25,
            sensitivity: 1.0,
            interface: "any".into(),
            map_all_traffic: true,
            reset_policy: ResetPolicy::KeepCounters,
        }
    }
}

/// Shared monitoring state, mutated concurrently by the capture loop, the
/// rate estimator, and enrichment tasks.
pub struct MonitorState {
    risk_score: Mutex<f64>,
    threat_log: Mutex<BoundedLog>,
    live_feed: Mutex<BoundedLog>,
    pps_history: Mutex<SlidingWindow>,
    proto_counts: Mutex<HashMap<String, u64>>,
    geo: Mutex<GeoTable>,
    packet_counter: AtomicU64,
    sensitivity: RwLock<f64>,
    heartbeat: RwLock<String>,
    is_running: AtomicBool,
    current_interface: RwLock<String>,
    map_all_traffic: AtomicBool,
    reset_policy: ResetPolicy,
}

impl MonitorState {
    pub fn new(opts: StateOptions) -> Self {
        Self {
            risk_score: Mutex::new(0.0),
            threat_log: Mutex::new(BoundedLog::new(THREAT_LOG_CAPACITY)),
            live_feed: Mutex::new(BoundedLog::new(opts.live_feed_capacity)),
            pps_history: Mutex::new(SlidingWindow::zeroed(PPS_WINDOW)),
            proto_counts: Mutex::new(HashMap::new()),
            geo: Mutex::new(GeoTable::default()),
            packet_counter: AtomicU64::new(0),
            sensitivity: RwLock::new(opts.sensitivity),
            heartbeat: RwLock::new("Initializing...".into()),
            is_running: AtomicBool::new(true),
            current_interface: RwLock::new(opts.interface),
            map_all_traffic: AtomicBool::new(opts.map_all_traffic),
            reset_policy: opts.reset_policy,
        }
    }

    // --- packet accounting ---

    /// Advances the monotonic packet counter by one, returning the new value.
    pub fn advance_packet_counter(&self) -> u64 {
        self.packet_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn packet_count(&self) -> u64 {
        self.packet_counter.load(Ordering::Relaxed)
    }

    pub fn count_protocol(&self, protocol: &str) {
        let mut counts = self.proto_counts.lock();
        *counts.entry(protocol.to_string()).or_insert(0) += 1;
    }

    pub fn record_traffic(&self, entry: String) {
        self.live_feed.lock().push(entry);
    }

    pub fn push_pps_sample(&self, sample: u64) {
        self.pps_history.lock().push(sample);
    }

    // --- risk ---

    /// Raises the risk score, clamped to `[0, RISK_CEILING]`.
    pub fn raise_risk(&self, amount: f64) -> f64 {
        let mut score = self.risk_score.lock();
        *score = (*score + amount).clamp(0.0, RISK_CEILING);
        *score
    }

    pub fn risk_score(&self) -> f64 {
        *self.risk_score.lock()
    }

    pub fn log_threat(&self, message: String) {
        self.threat_log.lock().push(message);
    }

    // --- enrichment ---

    pub fn is_seen(&self, ip: IpAddr) -> bool {
        self.geo.lock().is_seen(ip)
    }

    /// Records a resolved address, enforcing at-most-once resolution.
    ///
    /// Returns false when a racing enrichment already recorded the address.
    pub fn insert_geo(&self, record: GeoRecord) -> bool {
        self.geo.lock().insert(record)
    }

    pub fn geo_record_count(&self) -> usize {
        self.geo.lock().records().len()
    }

    // --- settings surface ---

    pub fn sensitivity(&self) -> f64 {
        *self.sensitivity.read()
    }

    /// Updates the risk multiplier. Non-positive values are ignored.
    pub fn set_sensitivity(&self, value: f64) {
        if value > 0.0 && value.is_finite() {
            *self.sensitivity.write() = value;
        }
    }

    pub fn interface(&self) -> String {
        self.current_interface.read().clone()
    }

    /// Takes effect on the next capture (re)start, never retroactively.
    pub fn set_interface(&self, interface: impl Into<String>) {
        *self.current_interface.write() = interface.into();
    }

    pub fn map_all_traffic(&self) -> bool {
        self.map_all_traffic.load(Ordering::Relaxed)
    }

    pub fn set_map_all_traffic(&self, enabled: bool) {
        self.map_all_traffic.store(enabled, Ordering::Relaxed);
    }

    // --- lifecycle ---

    pub fn touch_heartbeat(&self, status: impl Into<String>) {
        *self.heartbeat.write() = status.into();
    }

    pub fn heartbeat(&self) -> String {
        self.heartbeat.read().clone()
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Cooperative shutdown: loops observe this within one iteration or one
    /// sleep interval. In-flight lookups finish as best-effort no-ops.
    pub fn shutdown(&self) {
        self.is_running.store(false, Ordering::Relaxed);
    }

    /// Clears the risk score, threat log, and geolocation table.
    ///
    /// The packet counter and protocol counts are also zeroed only under
    /// [`ResetPolicy::ClearCounters`].
    pub fn reset_stats(&self) {
        *self.risk_score.lock() = 0.0;
        self.threat_log.lock().clear();
        self.geo.lock().clear();
        if self.reset_policy == ResetPolicy::ClearCounters {
            self.packet_counter.store(0, Ordering::Relaxed);
            self.proto_counts.lock().clear();
        }
    }

    /// Cloneable read-only view for the UI poller.
    ///
    /// Containers are locked one at a time, so the view is coherent per
    /// container but not across containers.
    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            risk_score: self.risk_score(),
            threat_log: self.threat_log.lock().to_vec(),
            live_feed: self.live_feed.lock().to_vec(),
            pps_history: self.pps_history.lock().to_vec(),
            proto_counts: self.proto_counts.lock().clone(),
            geo_records: self.geo.lock().records().to_vec(),
            heartbeat: self.heartbeat(),
            packet_count: self.packet_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoRecord;
    use proptest::prelude::*;

    fn state() -> MonitorState {
        MonitorState::new(StateOptions::default())
    }

    fn geo_record(ip: &str) -> GeoRecord {
        GeoRecord {
            ip: ip.parse().unwrap(),
            location: "Paris, France".into(),
            country: "France".into(),
            isp: "Example ISP".into(),
            org: "Example Org".into(),
            asn: "AS64500".into(),
            lat: 48.85,
            lon: 2.35,
            protocol: "TCP".into(),
            is_proxy: false,
            is_hosting: false,
        }
    }

    #[test]
    fn risk_is_clamped_at_ceiling() {
        let state = state();
        state.raise_risk(90.0);
        assert_eq!(state.raise_risk(20.0), 100.0);
        assert_eq!(state.risk_score(), 100.0);
    }

    #[test]
    fn threat_log_honors_capacity() {
        let state = state();
        for i in 0..40 {
            state.log_threat(format!("TCP Reset: 203.0.113.{i}"));
        }
        let log = state.snapshot().threat_log;
        assert_eq!(log.len(), THREAT_LOG_CAPACITY);
        assert_eq!(log[0], "TCP Reset: 203.0.113.39");
    }

    #[test]
    fn pps_history_is_always_full_length() {
        let state = state();
        assert_eq!(state.snapshot().pps_history.len(), PPS_WINDOW);
        for i in 0..100 {
            state.push_pps_sample(i);
        }
        assert_eq!(state.snapshot().pps_history.len(), PPS_WINDOW);
    }

    #[test]
    fn reset_keeps_counters_by_default() {
        let state = state();
        state.advance_packet_counter();
        state.count_protocol("DNS");
        state.raise_risk(40.0);
        state.log_threat("TCP Reset: 203.0.113.7".into());
        state.insert_geo(geo_record("203.0.113.7"));

        state.reset_stats();

        let snap = state.snapshot();
        assert_eq!(snap.risk_score, 0.0);
        assert!(snap.threat_log.is_empty());
        assert!(snap.geo_records.is_empty());
        assert!(!state.is_seen("203.0.113.7".parse().unwrap()));
        // KeepCounters: monotonic counters survive.
        assert_eq!(snap.packet_count, 1);
        assert_eq!(snap.proto_counts.get("DNS"), Some(&1));
    }

    #[test]
    fn reset_clears_counters_under_clear_policy() {
        let state = MonitorState::new(StateOptions {
            reset_policy: ResetPolicy::ClearCounters,
            ..StateOptions::default()
        });
        state.advance_packet_counter();
        state.count_protocol("DNS");

        state.reset_stats();

        let snap = state.snapshot();
        assert_eq!(snap.packet_count, 0);
        assert!(snap.proto_counts.is_empty());
    }

    #[test]
    fn sensitivity_rejects_non_positive_values() {
        let state = state();
        state.set_sensitivity(0.0);
        assert_eq!(state.sensitivity(), 1.0);
        state.set_sensitivity(-3.0);
        assert_eq!(state.sensitivity(), 1.0);
        state.set_sensitivity(2.0);
        assert_eq!(state.sensitivity(), 2.0);
    }

    #[test]
    fn second_geo_insert_for_same_ip_is_rejected() {
        let state = state();
        assert!(state.insert_geo(geo_record("198.51.100.4")));
        assert!(!state.insert_geo(geo_record("198.51.100.4")));
        assert_eq!(state.geo_record_count(), 1);
    }

    proptest! {
        #[test]
        fn risk_stays_in_range_for_any_burst(
            increments in proptest::collection::vec(0.0f64..500.0, 0..200),
            sensitivity in 0.1f64..10.0,
        ) {
            let state = state();
            state.set_sensitivity(sensitivity);
            for inc in increments {
                let score = state.raise_risk(inc * state.sensitivity());
                prop_assert!((0.0..=100.0).contains(&score));
            }
            prop_assert!((0.0..=100.0).contains(&state.risk_score()));
        }
    }
}
