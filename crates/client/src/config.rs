//! Client configuration.
//!
//! The base URL is always passed in explicitly; `from_env` is an opt-in
//! convenience for binaries and local runs.

use std::time::Duration;

/// Full base URL of the Movies API (e.g. `http://localhost:3001`).
pub const API_URL_ENV: &str = "MOVIES_API_URL";
/// Port of a locally running API, used when `MOVIES_API_URL` is unset.
pub const SERVER_PORT_ENV: &str = "SERVERPORT";
pub const DEFAULT_SERVER_PORT: u16 = 3001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL; `/movies` is resolved relative to it.
    pub base_url: String,
    /// Whole-request timeout enforced by the transport. `None` means no limit.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `MOVIES_API_URL`, falling back to `http://localhost:$SERVERPORT`
    /// (port 3001 when unset).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            return Self::new(url.trim());
        }

        let port = match lookup(SERVER_PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!(
                    value = %raw,
                    "invalid {SERVER_PORT_ENV}; using {DEFAULT_SERVER_PORT}"
                );
                DEFAULT_SERVER_PORT
            }),
            None => DEFAULT_SERVER_PORT,
        };

        tracing::warn!("{API_URL_ENV} not set; using local API on port {port}");
        Self::new(format!("http://localhost:{port}"))
    }
}
