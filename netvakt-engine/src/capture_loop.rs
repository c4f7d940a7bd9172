//! The self-healing capture loop.
//!
//! A four-phase state machine: `Starting` acquires the capture stream,
//! `Capturing` drains it, any stream error drops into `Backoff` which
//! unconditionally retries after a fixed delay, and `Stopped` is terminal.
//! Capture errors are recorded into the heartbeat and never escalate;
//! this retry loop is the system's only self-healing mechanism.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use netvakt_capture::{PacketEvent, PacketSource, PacketStream};
use netvakt_core::MonitorState;
use netvakt_enrich::GeoEnricher;
use netvakt_telemetry::MetricsRecorder;

use crate::classifier::classify;
use crate::recorder::TrafficRecorder;
use crate::scorer::ThreatScorer;

/// How long to wait on a quiet stream before re-checking the running flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(500);

enum Phase {
    Starting,
    Capturing(PacketStream),
    Backoff,
    Stopped,
}

pub struct CaptureLoop {
    state: Arc<MonitorState>,
    source: Arc<dyn PacketSource>,
    scorer: ThreatScorer,
    recorder: TrafficRecorder,
    enricher: GeoEnricher,
    metrics: Arc<MetricsRecorder>,
    filter: Option<String>,
    backoff: Duration,
}

impl CaptureLoop {
    pub fn new(
        state: Arc<MonitorState>,
        source: Arc<dyn PacketSource>,
        enricher: GeoEnricher,
        metrics: Arc<MetricsRecorder>,
        filter: Option<String>,
        backoff: Duration,
    ) -> Self {
        Self {
            scorer: ThreatScorer::new(Arc::clone(&state), Arc::clone(&metrics)),
            recorder: TrafficRecorder::new(Arc::clone(&state)),
            state,
            source,
            enricher,
            metrics,
            filter,
            backoff,
        }
    }

    /// Drives the state machine until shutdown.
    pub async fn run(self) {
        let mut phase = Phase::Starting;
        loop {
            phase = match phase {
                Phase::Starting => self.start().await,
                Phase::Capturing(stream) => self.capture(stream).await,
                Phase::Backoff => self.back_off().await,
                Phase::Stopped => break,
            };
        }
        info!("capture loop stopped");
    }

    async fn start(&self) -> Phase {
        if !self.state.is_running() {
            return Phase::Stopped;
        }
        // Re-read the interface so setting changes apply on each (re)start.
        let interface = self.state.interface();
        match self.source.open(&interface, self.filter.as_deref()).await {
            Ok(stream) => {
                info!(interface, "capture started");
                Phase::Capturing(stream)
            }
            Err(e) => {
                warn!(interface, "capture open failed: {e}");
                self.record_capture_error(&e.to_string());
                Phase::Backoff
            }
        }
    }

    async fn capture(&self, mut stream: PacketStream) -> Phase {
        while self.state.is_running() {
            match timeout(SHUTDOWN_POLL, stream.next_event()).await {
                // Quiet stream: re-check the running flag.
                Err(_elapsed) => continue,
                Ok(Some(Ok(event))) => self.handle_event(event).await,
                Ok(Some(Err(e))) => {
                    warn!("capture stream error: {e}");
                    self.record_capture_error(&e.to_string());
                    return Phase::Backoff;
                }
                Ok(None) => {
                    self.record_capture_error("capture stream closed");
                    return Phase::Backoff;
                }
            }
        }
        Phase::Stopped
    }

    async fn back_off(&self) -> Phase {
        sleep(self.backoff).await;
        if self.state.is_running() {
            Phase::Starting
        } else {
            Phase::Stopped
        }
    }

    fn record_capture_error(&self, reason: &str) {
        self.state.touch_heartbeat(format!("Error: {reason}"));
        self.metrics.capture_restarts_total.inc();
    }

    /// Per-packet processing: counter, heartbeat, classification, scoring,
    /// recording, and — out-of-band — enrichment dispatch.
    async fn handle_event(&self, event: PacketEvent) {
        self.state.advance_packet_counter();
        self.state
            .touch_heartbeat(Local::now().format("%H:%M:%S").to_string());
        self.metrics.packets_total.inc();

        let classification = classify(&event);
        self.scorer.score(&classification).await;
        self.recorder.record(&classification);

        if self.state.map_all_traffic() && classification.is_external_source {
            if let Some(ip) = classification.source {
                self.enricher.dispatch(ip, &classification.protocol);
            }
        }
    }
}
