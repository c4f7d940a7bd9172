//! # netvakt configuration
//!
//! Hierarchical configuration for the netvakt monitoring engine.
//!
//! ## Features
//! - **Unified Configuration**: single source of truth across all components
//! - **Validation**: runtime validation of critical parameters
//! - **Environment Awareness**: `NETVAKT_*` variables override file values

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod capture;
mod enrich;
mod error;
mod monitor;
mod validation;

pub use capture::CaptureConfig;
pub use enrich::EnrichConfig;
pub use error::ConfigError;
pub use monitor::MonitorConfig;

/// Top-level configuration container for all netvakt components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct NetvaktConfig {
    /// Packet capture parameters (interface, filter, restart backoff).
    #[validate(nested)]
    pub capture: CaptureConfig,

    /// Monitoring state parameters (sensitivity, feed sizes, reset policy).
    #[validate(nested)]
    pub monitor: MonitorConfig,

    /// Geolocation enrichment parameters.
    #[validate(nested)]
    pub enrich: EnrichConfig,
}

impl NetvaktConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/netvakt.yaml` - base settings. If missing, defaults are used.
    /// 3. `NETVAKT_*` environment variables (`__` separates nesting levels).
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(NetvaktConfig::default()));

        if Path::new("config/netvakt.yaml").exists() {
            figment = figment.merge(Yaml::file("config/netvakt.yaml"));
        }

        figment
            .merge(Env::prefixed("NETVAKT_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(NetvaktConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("NETVAKT_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_validation() {
        let config = NetvaktConfig::default();
        config.validate().expect("Default config should validate");
    }

    #[test]
    fn environment_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NETVAKT_MONITOR__SENSITIVITY", "2.0");
            let config = NetvaktConfig::load().expect("config should load");
            assert_eq!(config.monitor.sensitivity, 2.0);
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            NetvaktConfig::load_from_path("does/not/exist.yaml"),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
