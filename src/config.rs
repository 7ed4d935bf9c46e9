//! Client configuration from the environment

use crate::session::DEFAULT_GREETING;
use crate::transport::{TransportConfig, DEFAULT_BASE_URL};
use std::time::Duration;
use thiserror::Error;

pub const API_URL_ENV: &str = "TRAVEL_CHAT_API_URL";
pub const TIMEOUT_ENV: &str = "TRAVEL_CHAT_TIMEOUT_SECS";
pub const GREETING_ENV: &str = "TRAVEL_CHAT_GREETING";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TRAVEL_CHAT_TIMEOUT_SECS must be a positive number of seconds, got {0:?}")]
    InvalidTimeout(String),
    #[error("TRAVEL_CHAT_API_URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
}

/// Everything the client needs before the first turn
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub transport: TransportConfig,
    /// Seed bot message shown before the user types anything
    pub greeting: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl ClientConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to something unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is set but unusable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = match get(API_URL_ENV) {
            Some(url) => {
                let url = url.trim().to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidBaseUrl(url));
                }
                url
            }
            None => DEFAULT_BASE_URL.to_string(),
        };

        let timeout = match get(TIMEOUT_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => None,
        };

        Ok(Self {
            transport: TransportConfig { base_url, timeout },
            greeting: get(GREETING_ENV).unwrap_or_else(|| DEFAULT_GREETING.to_string()),
        })
    }
}
