//! Threat scoring: bounded risk accumulation plus the threat log.

use std::sync::Arc;

use opentelemetry::KeyValue;
use tracing::debug;

use netvakt_core::MonitorState;
use netvakt_telemetry::{EventLogger, MetricsRecorder};

use crate::classifier::Classification;

/// Base risk added per threat signal, before the sensitivity multiplier.
pub const RISK_INCREMENT: f64 = 20.0;

/// Scores classifications against the shared state.
///
/// Deterministic: the outcome depends only on the classification and the
/// sensitivity setting at the moment of scoring.
#[derive(Clone)]
pub struct ThreatScorer {
    state: Arc<MonitorState>,
    metrics: Arc<MetricsRecorder>,
}

impl ThreatScorer {
    pub fn new(state: Arc<MonitorState>, metrics: Arc<MetricsRecorder>) -> Self {
        Self { state, metrics }
    }

    /// No-op unless the classification carries a threat signal.
    pub async fn score(&self, classification: &Classification) {
        if !classification.is_threat_signal {
            return;
        }

        let source = classification.source_label();
        let added = RISK_INCREMENT * self.state.sensitivity();
        let score = self.state.raise_risk(added);
        self.state.log_threat(format!("TCP Reset: {source}"));
        self.metrics.threats_total.inc();

        debug!(%source, score, "threat signal scored");
        EventLogger::log_event(
            "tcp_reset",
            vec![
                KeyValue::new("source", source),
                KeyValue::new("protocol", classification.protocol.clone()),
            ],
        )
        .await;
    }
}
