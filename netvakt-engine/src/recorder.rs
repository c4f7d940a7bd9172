//! Live feed and per-protocol bookkeeping.

use std::sync::Arc;

use chrono::Local;

use netvakt_core::MonitorState;

use crate::classifier::Classification;

/// Appends one formatted feed entry and bumps the protocol counter per
/// packet. O(1) and lock-scoped per container, so it never holds up the
/// rest of the pipeline.
#[derive(Clone)]
pub struct TrafficRecorder {
    state: Arc<MonitorState>,
}

impl TrafficRecorder {
    pub fn new(state: Arc<MonitorState>) -> Self {
        Self { state }
    }

    pub fn record(&self, classification: &Classification) {
        let timestamp = Local::now().format("%H:%M:%S");
        self.state.record_traffic(format!(
            "{timestamp} | {} | {} -> {}",
            classification.protocol,
            classification.source_label(),
            classification.destination_label(),
        ));
        self.state.count_protocol(&classification.protocol);
    }
}
