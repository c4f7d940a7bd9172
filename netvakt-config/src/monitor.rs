//! Monitoring state configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Parameters for the shared monitoring state.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct MonitorConfig {
    /// Multiplier applied to every risk increment.
    #[validate(range(min = 0.1, max = 10.0))]
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,

    /// Enrich every external source address, not just flagged traffic.
    #[serde(default = "default_true")]
    pub map_all_traffic: bool,

    /// Capacity of the live activity feed. Deployments run between a
    /// compact (10) and a wide (25) feed.
    #[validate(range(min = 1, max = 256))]
    #[serde(default = "default_live_feed_capacity")]
    pub live_feed_capacity: usize,

    /// Whether `reset_stats` also zeroes the packet counter and the
    /// per-protocol counts.
    #[serde(default)]
    pub reset_clears_counters: bool,
}

fn default_sensitivity() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_live_feed_capacity() -> usize {
    25
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            map_all_traffic: default_true(),
            live_feed_capacity: default_live_feed_capacity(),
            reset_clears_counters: false,
        }
    }
}
