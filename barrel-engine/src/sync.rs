//! Synchronizer
//!
//! Pulls remote state into the entity cache and persists it to the local
//! mirror. Collections are split into two refresh tiers:
//!
//! * critical (barrels, activities, batches, notifications) — refetched on
//!   every refresh call
//! * static (locations, recipes, events, comments) — refetched only once
//!   the TTL has elapsed since the last static fetch
//!
//! Refresh never fails from the caller's perspective: a collection whose
//! fetch errors keeps its previous cache contents (stale-but-available) and
//! the error is logged. With the remote gate absent, refresh degrades to a
//! subscriber notification so observers still re-read after local mutations.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::cache::{Collection, EntityCache};
use crate::mirror::Mirror;
use crate::remote::{RemoteGate, RemoteStore, wire};

/// Fetch bound for the activity feed: consumers only render the recent tail.
const ACTIVITY_FETCH_LIMIT: u32 = 30;

/// Fetch bound for notifications, well under the retention cap.
const NOTIFICATION_FETCH_LIMIT: u32 = 15;

pub struct Synchronizer {
    cache: Arc<EntityCache>,
    mirror: Mirror,
    gate: Arc<RemoteGate>,
    static_ttl: Duration,
    last_static_fetch: Mutex<Option<Instant>>,
}

impl Synchronizer {
    pub fn new(
        cache: Arc<EntityCache>,
        mirror: Mirror,
        gate: Arc<RemoteGate>,
        static_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            mirror,
            gate,
            static_ttl,
            last_static_fetch: Mutex::new(None),
        }
    }

    /// Refresh the critical tier plus, when the TTL has elapsed, the static
    /// tier. Call after mutations and at startup.
    pub async fn refresh_all(&self) {
        let Some(store) = self.gate.store() else {
            self.cache.notify_subscribers();
            return;
        };

        let mut touched = self.fetch_tier(store, &Collection::CRITICAL).await;

        if self.static_tier_due() {
            touched.extend(self.fetch_tier(store, &Collection::STATIC).await);
            // Stamp the attempt, not the success: a failing remote should
            // not turn the static tier into a critical one.
            *self.last_static_fetch.lock().unwrap() = Some(Instant::now());
        }

        self.finish(touched);
    }

    /// Refresh only the critical tier (realtime-signal path).
    pub async fn refresh_critical(&self) {
        let Some(store) = self.gate.store() else {
            self.cache.notify_subscribers();
            return;
        };

        let touched = self.fetch_tier(store, &Collection::CRITICAL).await;
        self.finish(touched);
    }

    /// Force the next `refresh_all` to include the static tier.
    pub fn invalidate_static_tier(&self) {
        *self.last_static_fetch.lock().unwrap() = None;
    }

    fn static_tier_due(&self) -> bool {
        self.last_static_fetch
            .lock()
            .unwrap()
            .is_none_or(|at| at.elapsed() >= self.static_ttl)
    }

    /// Fetch each collection in the tier; collections that fail keep their
    /// previous cache contents. Returns the collections actually replaced.
    async fn fetch_tier(
        &self,
        store: &Arc<dyn RemoteStore>,
        tier: &[Collection],
    ) -> Vec<Collection> {
        let mut touched = Vec::with_capacity(tier.len());

        for &collection in tier {
            let limit = match collection {
                Collection::Activities => Some(ACTIVITY_FETCH_LIMIT),
                Collection::Notifications => Some(NOTIFICATION_FETCH_LIMIT),
                _ => None,
            };

            match store.fetch(collection, limit).await {
                Ok(rows) => {
                    self.cache.with_mut(|data| match collection {
                        Collection::Barrels => data.barrels = wire::barrels_to_domain(rows),
                        Collection::Locations => data.locations = wire::locations_to_domain(rows),
                        Collection::Batches => data.batches = wire::batches_to_domain(rows),
                        Collection::Activities => {
                            data.activities = wire::activities_to_domain(rows)
                        }
                        Collection::Events => data.events = wire::events_to_domain(rows),
                        Collection::Recipes => data.recipes = wire::recipes_to_domain(rows),
                        Collection::Notifications => {
                            data.notifications = wire::notifications_to_domain(rows)
                        }
                        Collection::Comments => data.comments = wire::comments_to_domain(rows),
                    });
                    touched.push(collection);
                }
                Err(e) => {
                    tracing::warn!(
                        table = collection.table(),
                        error = %e,
                        "Fetch failed; keeping cached snapshot"
                    );
                }
            }
        }

        touched
    }

    /// Persist whatever was replaced and notify. Observers are notified even
    /// when every fetch failed: a refresh may follow an optimistic local
    /// mutation, and that mutation still needs its fan-out.
    fn finish(&self, touched: Vec<Collection>) {
        if !touched.is_empty()
            && let Err(e) = self.mirror.persist(&self.cache.snapshot(), &touched)
        {
            tracing::error!(error = %e, "Failed to persist refreshed snapshot to mirror");
        }
        self.cache.notify_subscribers();
    }
}
