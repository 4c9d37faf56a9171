//! Process configuration, read once from the environment at startup

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_PORT: u16 = 8501;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set. Export it or add it to the service environment.")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gemini API key (`GOOGLE_API_KEY`)
    pub api_key: String,
    /// Model name (`PICTALK_MODEL`)
    pub model: String,
    /// API scheme + host (`PICTALK_API_BASE`)
    pub api_base: String,
    /// Listen port (`PICTALK_PORT`)
    pub port: u16,
    /// Optional outer deadline for model calls (`PICTALK_REQUEST_TIMEOUT_SECS`)
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("GOOGLE_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("GOOGLE_API_KEY"))?;

        let model = lookup("PICTALK_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_base = lookup("PICTALK_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let port = match lookup("PICTALK_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PICTALK_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let request_timeout = match lookup("PICTALK_REQUEST_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "PICTALK_REQUEST_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            None => None,
        };

        Ok(Self {
            api_key,
            model,
            api_base,
            port,
            request_timeout,
        })
    }
}
