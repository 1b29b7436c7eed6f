//! Remote data service boundary
//!
//! The engine talks to the remote service exclusively through the
//! [`RemoteStore`] trait; [`RemoteGate`] is the single switch, resolved once
//! at startup, between a live remote handle and local-only mode.

pub mod rest;
pub mod wire;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::cache::Collection;
use crate::config::Config;

pub use rest::RestRemoteStore;

/// Remote service errors. These never reach the consumer-facing API;
/// refresh and write paths log them and keep the last good snapshot.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Payload-free change signal. The realtime listener is a pure trigger:
/// any signal means "refetch the critical tier", never "apply this delta".
#[derive(Debug, Clone, Copy)]
pub struct ChangeSignal;

/// Collection-oriented remote data service.
///
/// Rows cross this boundary as raw JSON values in the wire schema; the wire
/// mapper (`remote::wire`) is the only code that looks inside them.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch rows with the collection's fixed column projection,
    /// optionally bounded.
    async fn fetch(&self, collection: Collection, limit: Option<u32>) -> RemoteResult<Vec<Value>>;

    async fn insert(&self, collection: Collection, row: Value) -> RemoteResult<()>;

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> RemoteResult<()>;

    async fn delete(&self, collection: Collection, id: &str) -> RemoteResult<()>;

    async fn delete_all(&self, collection: Collection) -> RemoteResult<()>;

    /// Subscribe to the change-notification channel scoped to the
    /// critical-tier collections.
    fn subscribe_changes(&self) -> broadcast::Receiver<ChangeSignal>;

    /// Start producing change signals (spawns background work if the
    /// implementation needs any). Idempotent.
    fn start_change_feed(self: Arc<Self>) {}
}

/// The remote client gate: either a live remote-service handle or absent.
///
/// Resolved once from configured credentials. "Absent" is permanent for the
/// session — there is no retry-until-available; a restart is required to
/// pick up new credentials.
pub enum RemoteGate {
    Absent,
    Present(Arc<dyn RemoteStore>),
}

impl RemoteGate {
    /// Resolve the gate from configuration. Invalid or placeholder
    /// credentials put the engine in local-only mode, logged once here.
    pub fn resolve(config: &Config) -> Self {
        if !credentials_look_valid(&config.remote_url) || !credentials_look_valid(&config.remote_key)
        {
            tracing::warn!(
                "Remote service not configured or credentials invalid; running in local-only mode"
            );
            return Self::Absent;
        }

        match RestRemoteStore::new(config) {
            Ok(store) => {
                tracing::info!(url = %config.remote_url, "Connected to remote data service");
                Self::Present(Arc::new(store))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to build remote client; local-only mode");
                Self::Absent
            }
        }
    }

    /// Gate with an explicit store (tests, embedded backends).
    pub fn with_store(store: Arc<dyn RemoteStore>) -> Self {
        Self::Present(store)
    }

    pub fn store(&self) -> Option<&Arc<dyn RemoteStore>> {
        match self {
            Self::Absent => None,
            Self::Present(store) => Some(store),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

/// Minimum length / non-placeholder check for configured credentials.
fn credentials_look_valid(value: &str) -> bool {
    value.len() > 10 && value != "undefined" && value != "null"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_credentials_are_rejected() {
        assert!(!credentials_look_valid(""));
        assert!(!credentials_look_valid("undefined"));
        assert!(!credentials_look_valid("null"));
        assert!(!credentials_look_valid("short"));
        assert!(credentials_look_valid("https://xyz.supabase.co"));
    }

    #[test]
    fn default_config_resolves_to_absent() {
        // Default carries no credentials and reads no environment
        let config = Config::default();
        assert!(config.remote_url.is_empty());
        assert!(!RemoteGate::resolve(&config).is_present());
    }
}
