//! Client configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REFRESH_THROTTLE_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base '{0}': expected an http:// or https:// URL")]
    InvalidApiBase(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root without a trailing slash.
    pub api_base: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Minimum gap between silent product refreshes on section re-entry.
    pub refresh_throttle: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            refresh_throttle: Duration::from_millis(DEFAULT_REFRESH_THROTTLE_MS),
        }
    }
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `CLAUDSTORE_API_BASE`: default `http://localhost:8000`
    /// - `CLAUDSTORE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CLAUDSTORE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `CLAUDSTORE_REFRESH_THROTTLE_MS`: default 1000
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiBase`] if the API base is not an HTTP URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiBase`] if the API base is not an HTTP URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = match lookup("CLAUDSTORE_API_BASE") {
            Some(raw) if !raw.trim().is_empty() => normalize_api_base(&raw)?,
            _ => DEFAULT_API_BASE.to_owned(),
        };
        Ok(Self {
            api_base,
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "CLAUDSTORE_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(parse_or(
                &lookup,
                "CLAUDSTORE_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            refresh_throttle: Duration::from_millis(parse_or(
                &lookup,
                "CLAUDSTORE_REFRESH_THROTTLE_MS",
                DEFAULT_REFRESH_THROTTLE_MS,
            )),
        })
    }

    /// Replace the API base, e.g. from a command-line flag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiBase`] if `raw` is not an HTTP URL.
    pub fn with_api_base(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_base = normalize_api_base(raw)?;
        Ok(self)
    }
}

/// Trim whitespace and trailing slashes, and require an HTTP scheme.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidApiBase`] for anything else.
pub fn normalize_api_base(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| ConfigError::InvalidApiBase(raw.trim().to_owned()))?;
    if host.is_empty() {
        return Err(ConfigError::InvalidApiBase(raw.trim().to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn parse_or<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
