//! # netvakt telemetry
//!
//! Logging and metrics for the monitoring engine.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
