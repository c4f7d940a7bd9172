//! # netvakt-engine
//!
//! The concurrent monitoring engine: packet classification, threat scoring,
//! traffic recording, rate estimation, and the self-healing capture loop
//! that drives them, all sharing one [`netvakt_core::MonitorState`].
//!
//! Failure semantics: capture errors back the loop off and retry forever;
//! lookup failures drop one attempt; undecodable packets are skipped. No
//! single packet or lookup failure terminates anything.

mod capture_loop;
mod classifier;
mod error;
mod rate;
mod recorder;
mod runtime;
mod scorer;

pub use capture_loop::CaptureLoop;
pub use classifier::{classify, Classification, INTERNAL_LABEL};
pub use error::EngineError;
pub use rate::RateEstimator;
pub use recorder::TrafficRecorder;
pub use runtime::MonitorRuntime;
pub use scorer::{ThreatScorer, RISK_INCREMENT};

pub mod prelude {
    pub use super::{CaptureLoop, EngineError, MonitorRuntime, RateEstimator};
}
