//! Engine configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | REMOTE_URL | (empty) | Remote data service base URL |
//! | REMOTE_ANON_KEY | (empty) | Remote data service API key |
//! | DATA_DIR | ./data | Directory holding the local mirror |
//! | STATIC_TTL_SECS | 300 | Static-tier refetch window |
//! | REALTIME_POLL_MS | 5000 | Change-feed poll interval |
//!
//! Credentials left empty (or set to a placeholder) put the engine in
//! local-only mode for the whole session; see `RemoteGate`.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Remote data service base URL (e.g. "https://xyz.supabase.co").
    pub remote_url: String,
    /// Remote data service API key.
    pub remote_key: String,
    /// Directory for the local mirror database file.
    pub data_dir: String,
    /// Static-tier collections are refetched at most once per window.
    pub static_ttl: Duration,
    /// Interval of the change-feed poller.
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables (with `.env` support).
    ///
    /// Unset variables fall back to defaults.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self {
            remote_url: std::env::var("REMOTE_URL").unwrap_or_default(),
            remote_key: std::env::var("REMOTE_ANON_KEY").unwrap_or_default(),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()),
            static_ttl: Duration::from_secs(
                std::env::var("STATIC_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(300),
            ),
            poll_interval: Duration::from_millis(
                std::env::var("REALTIME_POLL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5000),
            ),
        }
    }
}

/// Inert defaults: no remote credentials (local-only mode) and the same
/// fallback values `from_env` uses. Reads no environment.
impl Default for Config {
    fn default() -> Self {
        Self {
            remote_url: String::new(),
            remote_key: String::new(),
            data_dir: "./data".into(),
            static_ttl: Duration::from_secs(300),
            poll_interval: Duration::from_millis(5000),
        }
    }
}
