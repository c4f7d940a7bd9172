//! Packet capture configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Capture acquisition parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CaptureConfig {
    /// Network interface to monitor ("any" for all devices).
    #[validate(custom(function = validation::validate_interface))]
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Optional BPF filter expression applied to the capture stream.
    #[serde(default)]
    pub filter: Option<String>,

    /// Run in promiscuous mode?
    #[serde(default = "default_promiscuous")]
    pub promiscuous: bool,

    /// Capture snap length in bytes.
    #[validate(range(min = 256, max = 262144))]
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Delay before reopening the stream after a capture error (seconds).
    #[validate(range(min = 1, max = 60))]
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

fn default_interface() -> String {
    "any".into()
}

fn default_promiscuous() -> bool {
    true
}

fn default_buffer_size() -> usize {
    65535
}

fn default_backoff_secs() -> u64 {
    2
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            filter: None,
            promiscuous: default_promiscuous(),
            buffer_size: default_buffer_size(),
            backoff_secs: default_backoff_secs(),
        }
    }
}
