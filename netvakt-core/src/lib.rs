//! # netvakt-core
//!
//! Shared monitoring state for the netvakt engine.
//!
//! A single [`MonitorState`] aggregate is mutated concurrently by the capture
//! loop, the rate estimator, and in-flight enrichment tasks, and read by an
//! external poller at its own cadence. Every container is individually locked;
//! cross-container atomicity is deliberately not provided — a reader may
//! observe the risk score updated before the matching threat-log entry lands.
//!
//! ### Key Submodules:
//! - `state`: the shared aggregate and its mutation entry points
//! - `bounded`: fixed-capacity log and sliding sample window
//! - `geo`: enrichment records and the at-most-once resolution table
//! - `snapshot`: cloneable read-only view for the UI layer

pub mod addr;
pub mod bounded;
pub mod geo;
pub mod snapshot;
pub mod state;

pub mod prelude {
    pub use crate::addr::is_public;
    pub use crate::bounded::{BoundedLog, SlidingWindow};
    pub use crate::geo::GeoRecord;
    pub use crate::snapshot::MonitorSnapshot;
    pub use crate::state::{MonitorState, ResetPolicy, StateOptions};
}

pub use snapshot::MonitorSnapshot;
pub use state::MonitorState;
