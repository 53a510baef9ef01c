//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const API_VERSION_PATH: &str = "/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors raised while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("no data directory available; set TRAVELMAPS_DATA_DIR")]
    NoDataDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server origin plus the fixed version segment, without a trailing slash.
    pub api_base_url: String,
    pub timeouts: HttpTimeouts,
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `TRAVELMAPS_API_URL`: server origin, default `http://localhost:3000`
    /// - `TRAVELMAPS_REQUEST_TIMEOUT_SECS`: default 30
    /// - `TRAVELMAPS_CONNECT_TIMEOUT_SECS`: default 10
    /// - `TRAVELMAPS_DATA_DIR`: default `<platform data dir>/travelmaps`
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL does not parse or no data directory
    /// can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        let origin = std::env::var("TRAVELMAPS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let data_dir = match std::env::var_os("TRAVELMAPS_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("TRAVELMAPS_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("TRAVELMAPS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Self::new(&origin, data_dir).map(|cfg| cfg.with_timeouts(timeouts))
    }

    /// Build config for an explicit server origin.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `origin` is not an absolute
    /// http(s) URL.
    pub fn new(origin: &str, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: api_base_url(origin)?,
            timeouts: HttpTimeouts::default(),
            data_dir: data_dir.into(),
        })
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: HttpTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

/// Normalize a server origin into the versioned API base URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] for unparsable or non-http URLs.
pub fn api_base_url(origin: &str) -> Result<String, ConfigError> {
    let trimmed = origin.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidBaseUrl { url: origin.to_owned(), reason: e.to_string() })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: origin.to_owned(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(format!("{trimmed}{API_VERSION_PATH}"))
}

/// `<platform data dir>/travelmaps`.
///
/// # Errors
///
/// Returns [`ConfigError::NoDataDir`] on platforms without one.
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("travelmaps"))
        .ok_or(ConfigError::NoDataDir)
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
