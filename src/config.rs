//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

use crate::router::DEFAULT_LOGIN_PATH;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const STORE_FILE_NAME: &str = "session.json";
const APP_DIR_NAME: &str = "hop4deals";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("no data directory available; set HOP4DEALS_STORE")]
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
pub struct Config {
    /// REST API base, without trailing slash.
    pub api_url: String,
    /// File backing the durable session store.
    pub store_path: PathBuf,
    /// Route the guard sends signed-out visitors to.
    pub login_path: String,
    pub timeouts: HttpTimeouts,
}

impl Config {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `HOP4DEALS_API_URL`: default `http://127.0.0.1:5000/api`
    /// - `HOP4DEALS_STORE`: default `<data dir>/hop4deals/session.json`
    /// - `HOP4DEALS_LOGIN_PATH`: default `/896552147/login`
    /// - `HOP4DEALS_REQUEST_TIMEOUT_SECS`: default 30
    /// - `HOP4DEALS_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed URL or login path, or when no store
    /// path is given and the platform has no data directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = parse_api_url(std::env::var("HOP4DEALS_API_URL").ok().as_deref())?;
        let login_path = parse_login_path(std::env::var("HOP4DEALS_LOGIN_PATH").ok().as_deref())?;
        let store_path = match std::env::var("HOP4DEALS_STORE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_store_path()?,
        };
        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("HOP4DEALS_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("HOP4DEALS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self { api_url, store_path, login_path, timeouts })
    }

    /// Replace the API base, validating it the same way `from_env` does.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an http(s) URL.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(Some(raw))?;
        Ok(self)
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_api_url(raw: Option<&str>) -> Result<String, ConfigError> {
    let url = raw.map_or(DEFAULT_API_URL, str::trim).trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            var: "HOP4DEALS_API_URL",
            reason: format!("expected http:// or https:// URL, got '{url}'"),
        });
    }
    Ok(url.to_owned())
}

fn parse_login_path(raw: Option<&str>) -> Result<String, ConfigError> {
    let path = raw.map_or(DEFAULT_LOGIN_PATH, str::trim);
    if !path.starts_with('/') || path == "/" {
        return Err(ConfigError::Invalid {
            var: "HOP4DEALS_LOGIN_PATH",
            reason: format!("expected an absolute non-root path, got '{path}'"),
        });
    }
    Ok(path.to_owned())
}

fn default_store_path() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(STORE_FILE_NAME))
        .ok_or(ConfigError::NoDataDir)
}
