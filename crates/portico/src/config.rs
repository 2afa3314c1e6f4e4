//! Application configuration, from code or from the environment.

use std::path::PathBuf;
use std::time::Duration;

use portico_client::{ClientConfig, DEFAULT_LOGIN_PATH, DEFAULT_TOKEN_KEY};
use portico_session::RefreshConfig;

use crate::PorticoError;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Everything needed to build a [`Portico`](crate::Portico).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PorticoConfig {
    /// Backend origin, no trailing slash.
    pub api_base: String,
    /// Path prefix for every endpoint. May be empty.
    pub api_prefix: String,
    /// Per-request deadline enforced by the HTTP transport.
    pub timeout: Duration,
    /// Key the token is stored under in the primary store.
    pub token_key: String,
    /// Cookie name checked when the primary store has no token.
    pub token_cookie: String,
    /// Persist the token to this JSON file instead of memory.
    pub token_file: Option<PathBuf>,
    /// Route the 401 handler sends people to.
    pub login_path: String,
    /// Background refresh; off when `None`.
    pub refresh: Option<RefreshConfig>,
}

impl Default for PorticoConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            token_key: DEFAULT_TOKEN_KEY.to_owned(),
            token_cookie: DEFAULT_TOKEN_KEY.to_owned(),
            token_file: None,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            refresh: None,
        }
    }
}

impl PorticoConfig {
    /// Build config from process environment variables.
    ///
    /// Optional:
    /// - `PORTICO_API_BASE`: default `http://127.0.0.1:5000`
    /// - `PORTICO_API_PREFIX`: default `/api`, may be empty
    /// - `PORTICO_TIMEOUT_MS`: default 5000, must be a positive integer
    /// - `PORTICO_TOKEN_KEY` / `PORTICO_TOKEN_COOKIE`: default `session_token`
    /// - `PORTICO_TOKEN_FILE`: persist the token to this file
    /// - `PORTICO_LOGIN_PATH`: default `/login`
    /// - `PORTICO_REFRESH_SECS`: enables background refresh at this interval,
    ///   at most one day
    pub fn from_env() -> Result<Self, PorticoError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PorticoError> {
        let defaults = Self::default();

        let api_base = lookup("PORTICO_API_BASE")
            .unwrap_or(defaults.api_base)
            .trim_end_matches('/')
            .to_owned();
        let api_prefix = lookup("PORTICO_API_PREFIX").unwrap_or(defaults.api_prefix);
        let timeout = match lookup("PORTICO_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(parse_positive("PORTICO_TIMEOUT_MS", &raw)?),
            None => defaults.timeout,
        };
        let refresh = lookup("PORTICO_REFRESH_SECS")
            .map(|raw| parse_refresh_secs(&raw))
            .transpose()?
            .map(|secs| RefreshConfig::every(Duration::from_secs(secs)));

        Ok(Self {
            api_base,
            api_prefix,
            timeout,
            token_key: non_empty(lookup("PORTICO_TOKEN_KEY")).unwrap_or(defaults.token_key),
            token_cookie: non_empty(lookup("PORTICO_TOKEN_COOKIE")).unwrap_or(defaults.token_cookie),
            token_file: non_empty(lookup("PORTICO_TOKEN_FILE")).map(PathBuf::from),
            login_path: non_empty(lookup("PORTICO_LOGIN_PATH")).unwrap_or(defaults.login_path),
            refresh,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_base.clone())
            .with_api_prefix(self.api_prefix.clone())
            .with_login_path(self.login_path.clone())
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64, PorticoError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(PorticoError::Config(format!("{key} must be greater than zero"))),
        Ok(v) => Ok(v),
        Err(_) => Err(PorticoError::Config(format!("{key} must be a positive integer, got '{raw}'"))),
    }
}

fn parse_refresh_secs(raw: &str) -> Result<u64, PorticoError> {
    let secs = parse_positive("PORTICO_REFRESH_SECS", raw)?;
    let max = RefreshConfig::MAX_INTERVAL.as_secs();
    if secs > max {
        return Err(PorticoError::Config(format!(
            "PORTICO_REFRESH_SECS must be at most {max}, got {secs}"
        )));
    }
    Ok(secs)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
