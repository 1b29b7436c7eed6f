//! Entity Cache + Subscriber Registry
//!
//! In-memory collections that every read operation is served from. Written
//! by store mutators (optimistically, before the backend commit) and by the
//! synchronizer when a refresh lands; last completed write wins. Consumers
//! receive the cache by reference through the store — there is no
//! module-level singleton.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use shared::models::{
    Activity, Barrel, Batch, BreweryEvent, Comment, Location, Notification, Recipe,
};

/// Entity collection identifiers.
///
/// Used for mirror keys, remote table names and refresh tiering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Barrels,
    Locations,
    Batches,
    Activities,
    Events,
    Recipes,
    Notifications,
    Comments,
}

impl Collection {
    /// Every collection, in mirror-persist order.
    pub const ALL: [Collection; 8] = [
        Collection::Barrels,
        Collection::Locations,
        Collection::Batches,
        Collection::Activities,
        Collection::Events,
        Collection::Recipes,
        Collection::Notifications,
        Collection::Comments,
    ];

    /// Collections refetched after every mutation and on realtime signals.
    pub const CRITICAL: [Collection; 4] = [
        Collection::Barrels,
        Collection::Activities,
        Collection::Batches,
        Collection::Notifications,
    ];

    /// Collections refetched only after the static-tier TTL elapses.
    pub const STATIC: [Collection; 4] = [
        Collection::Locations,
        Collection::Recipes,
        Collection::Events,
        Collection::Comments,
    ];

    /// Mirror key for this collection (legacy `bt_` prefix kept for
    /// compatibility with snapshots written by the web client).
    pub fn key(&self) -> &'static str {
        match self {
            Self::Barrels => "bt_barrels",
            Self::Locations => "bt_locations",
            Self::Batches => "bt_batches",
            Self::Activities => "bt_activities",
            Self::Events => "bt_events",
            Self::Recipes => "bt_recipes",
            Self::Notifications => "bt_notifications",
            Self::Comments => "bt_comments",
        }
    }

    /// Remote table name.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Barrels => "barrels",
            Self::Locations => "locations",
            Self::Batches => "batches",
            Self::Activities => "activities",
            Self::Events => "events",
            Self::Recipes => "recipes",
            Self::Notifications => "notifications",
            Self::Comments => "comments",
        }
    }
}

/// All cached entity collections.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub barrels: Vec<Barrel>,
    pub locations: Vec<Location>,
    pub batches: Vec<Batch>,
    pub activities: Vec<Activity>,
    pub events: Vec<BreweryEvent>,
    pub recipes: Vec<Recipe>,
    pub notifications: Vec<Notification>,
    pub comments: Vec<Comment>,
}

impl Collections {
    pub fn is_empty(&self) -> bool {
        self.barrels.is_empty()
            && self.locations.is_empty()
            && self.batches.is_empty()
            && self.activities.is_empty()
            && self.events.is_empty()
            && self.recipes.is_empty()
            && self.notifications.is_empty()
            && self.comments.is_empty()
    }
}

type SubscriberFn = Box<dyn Fn() + Send + Sync>;

/// In-memory entity cache with synchronous snapshot reads.
pub struct EntityCache {
    inner: RwLock<Collections>,
    subscribers: Mutex<HashMap<u64, SubscriberFn>>,
    next_sub_id: AtomicU64,
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collections::default()),
            subscribers: Mutex::new(HashMap::new()),
            next_sub_id: AtomicU64::new(1),
        }
    }

    // ========== Read API (no network wait, clones the snapshot) ==========

    pub fn barrels(&self) -> Vec<Barrel> {
        self.inner.read().unwrap().barrels.clone()
    }

    pub fn barrel(&self, id: &str) -> Option<Barrel> {
        self.inner
            .read()
            .unwrap()
            .barrels
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    /// Locations with the derived `barrel_count` filled in.
    pub fn locations(&self) -> Vec<Location> {
        let data = self.inner.read().unwrap();
        data.locations
            .iter()
            .map(|loc| {
                let mut loc = loc.clone();
                loc.barrel_count = Some(
                    data.barrels
                        .iter()
                        .filter(|b| b.last_location_id.as_deref() == Some(loc.id.as_str()))
                        .count(),
                );
                loc
            })
            .collect()
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.inner.read().unwrap().batches.clone()
    }

    /// Activities newest-first, optionally bounded to the most recent `limit`.
    pub fn activities(&self, limit: Option<usize>) -> Vec<Activity> {
        let mut list = self.inner.read().unwrap().activities.clone();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(n) = limit {
            list.truncate(n);
        }
        list
    }

    pub fn events(&self) -> Vec<BreweryEvent> {
        self.inner.read().unwrap().events.clone()
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.inner.read().unwrap().recipes.clone()
    }

    /// Notifications newest-first.
    pub fn notifications(&self) -> Vec<Notification> {
        let mut list = self.inner.read().unwrap().notifications.clone();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    pub fn comments_for(&self, barrel_id: &str) -> Vec<Comment> {
        self.inner
            .read()
            .unwrap()
            .comments
            .iter()
            .filter(|c| c.barrel_id == barrel_id)
            .cloned()
            .collect()
    }

    /// Full snapshot clone (mirror persistence, assistant snapshot).
    pub fn snapshot(&self) -> Collections {
        self.inner.read().unwrap().clone()
    }

    // ========== Write API (synchronizer and local-mode mutators only) ==========

    /// Run a mutation against the collections. The lock is released before
    /// the closure's result is returned; callers notify subscribers
    /// themselves once persistence is done.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Collections) -> R) -> R {
        let mut data = self.inner.write().unwrap();
        f(&mut data)
    }

    /// Replace the whole snapshot (mirror restore at startup).
    pub fn replace(&self, data: Collections) {
        *self.inner.write().unwrap() = data;
    }

    // ========== Subscriber Registry ==========

    /// Register a change callback. Callbacks carry no payload; observers
    /// re-read the cache. The subscription is removed when the returned
    /// guard is dropped.
    pub fn subscribe(self: Arc<Self>, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap()
            .insert(id, Box::new(callback));
        Subscription {
            cache: Arc::downgrade(&self),
            id,
        }
    }

    /// Invoke all registered callbacks synchronously.
    pub fn notify_subscribers(&self) {
        let subs = self.subscribers.lock().unwrap();
        for callback in subs.values() {
            callback();
        }
    }
}

/// Guard for a registered subscriber; unsubscribes on drop.
pub struct Subscription {
    cache: Weak<EntityCache>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cache) = self.cache.upgrade() {
            cache.subscribers.lock().unwrap().remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn subscribers_fan_out_and_unsubscribe_on_drop() {
        let cache = Arc::new(EntityCache::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        let sub = Arc::clone(&cache).subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        cache.notify_subscribers();
        cache.notify_subscribers();
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        drop(sub);
        cache.notify_subscribers();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn location_barrel_count_is_derived() {
        let cache = EntityCache::new();
        cache.with_mut(|data| {
            data.locations.push(shared::models::Location {
                id: "loc-1".into(),
                name: "Bodega Principal".into(),
                address: "Calle Falsa 123".into(),
                lat: "-33.44".into(),
                lng: "-70.66".into(),
                barrel_count: None,
            });
            data.barrels.push(shared::models::Barrel {
                id: "b-1".into(),
                code: "BRL-001".into(),
                capacity: 50.0,
                beer_type: shared::models::BeerType::GoldenAle,
                status: shared::models::BarrelStatus::CleanInWarehouse,
                last_location_id: Some("loc-1".into()),
                last_location_name: Some("Bodega Principal".into()),
                last_update: shared::util::now_iso(),
                created_at: shared::util::now_iso(),
            });
        });

        let locations = cache.locations();
        assert_eq!(locations[0].barrel_count, Some(1));
    }
}
