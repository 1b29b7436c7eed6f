//! Realtime invalidation listener
//!
//! Bridges the remote change feed to the synchronizer: every signal triggers
//! a critical-tier refresh. Signals are pure triggers with no payload, so a
//! lagged receiver loses nothing — the refresh it eventually runs reads the
//! current remote state either way.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::remote::RemoteGate;
use crate::sync::Synchronizer;

/// Start the change feed and spawn the listener task. No-op when the gate
/// is absent. Returns whether a listener was actually spawned.
pub fn spawn_invalidation_listener(gate: &RemoteGate, sync: Arc<Synchronizer>) -> bool {
    let Some(store) = gate.store() else {
        return false;
    };

    let mut receiver = store.subscribe_changes();
    store.clone().start_change_feed();

    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(_) => {
                    tracing::debug!("Remote change signal; refreshing critical tier");
                    sync.refresh_critical().await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Coalesced signals collapse into one refresh
                    tracing::debug!(skipped, "Change feed lagged; refreshing once");
                    sync.refresh_critical().await;
                }
                Err(RecvError::Closed) => {
                    tracing::warn!("Change feed closed; realtime invalidation stopped");
                    break;
                }
            }
        }
    });

    true
}
