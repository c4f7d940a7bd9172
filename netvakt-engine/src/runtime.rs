//! Engine runtime: wires configuration, state, and background tasks.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use netvakt_capture::PacketSource;
use netvakt_config::NetvaktConfig;
use netvakt_core::state::{ResetPolicy, StateOptions};
use netvakt_core::{MonitorSnapshot, MonitorState};
use netvakt_enrich::{GeoEnricher, GeoLookup};
use netvakt_telemetry::MetricsRecorder;

use crate::capture_loop::CaptureLoop;
use crate::error::EngineError;
use crate::rate::RateEstimator;

/// Interval between rate samples.
const RATE_PERIOD: Duration = Duration::from_secs(1);

/// Owns the shared state and coordinates the capture loop, the rate
/// estimator, and enrichment dispatch. The surrounding application keeps an
/// `Arc<MonitorRuntime>` for its settings controller and snapshot poller.
pub struct MonitorRuntime {
    config: NetvaktConfig,
    state: Arc<MonitorState>,
    metrics: Arc<MetricsRecorder>,
    source: Arc<dyn PacketSource>,
    enricher: GeoEnricher,
}

impl MonitorRuntime {
    pub fn new(
        config: NetvaktConfig,
        source: Arc<dyn PacketSource>,
        lookup: Arc<dyn GeoLookup>,
    ) -> Self {
        debug!(?config, "initializing monitor runtime");

        let state = Arc::new(MonitorState::new(StateOptions {
            live_feed_capacity: config.monitor.live_feed_capacity,
            sensitivity: config.monitor.sensitivity,
            interface: config.capture.interface.clone(),
            map_all_traffic: config.monitor.map_all_traffic,
            reset_policy: if config.monitor.reset_clears_counters {
                ResetPolicy::ClearCounters
            } else {
                ResetPolicy::KeepCounters
            },
        }));
        let metrics = Arc::new(MetricsRecorder::new());
        let enricher = GeoEnricher::new(
            Arc::clone(&state),
            lookup,
            Arc::clone(&metrics),
            config.enrich.skip_networks.clone(),
            config.enrich.max_concurrent,
        );

        Self {
            config,
            state,
            metrics,
            source,
            enricher,
        }
    }

    /// Runs the capture loop and rate estimator to completion, i.e. until
    /// [`MonitorState::shutdown`] is called.
    pub async fn run(self: Arc<Self>) -> Result<(), EngineError> {
        info!(
            interface = %self.state.interface(),
            "starting monitoring engine"
        );

        let estimator = RateEstimator::new(Arc::clone(&self.state), RATE_PERIOD);
        let estimator_task = tokio::spawn(estimator.run());

        let capture = CaptureLoop::new(
            Arc::clone(&self.state),
            Arc::clone(&self.source),
            self.enricher.clone(),
            Arc::clone(&self.metrics),
            self.config.capture.filter.clone(),
            Duration::from_secs(self.config.capture.backoff_secs),
        );
        let capture_task = tokio::spawn(capture.run());

        let (capture_result, estimator_result) = tokio::join!(capture_task, estimator_task);
        capture_result?;
        estimator_result?;

        info!("monitoring engine shut down");
        Ok(())
    }

    // --- surface exposed to the settings controller and UI poller ---

    pub fn state(&self) -> &Arc<MonitorState> {
        &self.state
    }

    pub fn metrics(&self) -> &Arc<MetricsRecorder> {
        &self.metrics
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        self.state.snapshot()
    }

    pub fn reset_stats(&self) {
        self.state.reset_stats();
    }

    pub fn shutdown(&self) {
        self.state.shutdown();
    }
}
