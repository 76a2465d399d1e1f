//! Service configuration read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SERVICE_PORT` | `5000` |
//! | `DEVCAMPER_DB_PATH` | `devcamper.db` (`:memory:` keeps records in process) |
//! | `GEOCODER_API_KEY` | empty |
//! | `GEOCODER_BASE_URL` | `https://www.mapquestapi.com` |
//! | `GEOCODER_TIMEOUT_SECS` | `10` |
//!
//! Metrics settings come from [`MetricsConfig::from_env`].

use std::path::PathBuf;
use std::time::Duration;

use devcamper_lib::DEFAULT_MAPQUEST_BASE_URL;
use thiserror::Error;

use crate::metrics::MetricsConfig;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DB_PATH: &str = "devcamper.db";
pub const IN_MEMORY_DB: &str = ":memory:";
const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Where records are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    Sqlite(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocoderConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_MAPQUEST_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_GEOCODER_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub store: StoreLocation,
    pub geocoder: GeocoderConfig,
    pub metrics: MetricsConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            store: StoreLocation::Sqlite(PathBuf::from(DEFAULT_DB_PATH)),
            geocoder: GeocoderConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source. Empty values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("SERVICE_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "SERVICE_PORT",
                expected: "a port number",
                value: raw,
            })?,
            None => defaults.port,
        };

        let store = match get("DEVCAMPER_DB_PATH") {
            Some(path) if path == IN_MEMORY_DB => StoreLocation::Memory,
            Some(path) => StoreLocation::Sqlite(PathBuf::from(path)),
            None => defaults.store,
        };

        let timeout = match get("GEOCODER_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "GEOCODER_TIMEOUT_SECS",
                        expected: "a positive number of seconds",
                        value: raw,
                    })
                }
            },
            None => defaults.geocoder.timeout,
        };

        let geocoder = GeocoderConfig {
            api_key: get("GEOCODER_API_KEY").unwrap_or_default(),
            base_url: get("GEOCODER_BASE_URL").unwrap_or(defaults.geocoder.base_url),
            timeout,
        };

        Ok(Self {
            port,
            store,
            geocoder,
            metrics: MetricsConfig::from_lookup(&lookup),
        })
    }
}
