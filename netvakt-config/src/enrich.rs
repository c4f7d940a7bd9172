//! Geolocation enrichment configuration.

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Parameters for the external lookup service and the enrichment tasks.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct EnrichConfig {
    /// Base URL of the lookup service; the address is appended per request.
    #[validate(url)]
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-lookup timeout (milliseconds).
    #[validate(range(min = 100, max = 30_000))]
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of lookups in flight at once.
    #[validate(range(min = 1, max = 64))]
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Address ranges never sent to the lookup service, in addition to the
    /// built-in private/loopback/link-local scopes.
    #[validate(custom(function = validation::validate_cidr_list))]
    #[serde(default)]
    pub skip_networks: Vec<IpNetwork>,
}

fn default_endpoint() -> String {
    "http://ip-api.com/json".into()
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_max_concurrent() -> usize {
    8
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            max_concurrent: default_max_concurrent(),
            skip_networks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enrich_config_is_valid() {
        EnrichConfig::default().validate().unwrap();
    }

    #[test]
    fn skip_networks_accept_cidr_ranges() {
        let mut config = EnrichConfig::default();
        config.skip_networks.push("100.64.0.0/10".parse().unwrap());
        config.validate().unwrap();
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let mut config = EnrichConfig::default();
        config.endpoint = "not a url".into();
        assert!(config.validate().is_err());
    }
}
