//! Remote-mode tests against an in-process mock of the remote data service:
//! startup hydration, refresh tiering, stale-but-available failure handling
//! and realtime invalidation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use barrel_engine::remote::{ChangeSignal, RemoteError, RemoteResult, RemoteStore};
use barrel_engine::{BarrelStore, Collection, Config, EntityCache, Mirror, RemoteGate, Synchronizer};
use serde_json::{Value, json};
use tokio::sync::broadcast;

/// Scripted remote service: serves canned rows per table, counts fetches,
/// records writes and can be flipped into a failing state.
struct MockRemote {
    rows: Mutex<HashMap<&'static str, Vec<Value>>>,
    fetch_counts: Mutex<HashMap<&'static str, usize>>,
    failing: AtomicBool,
    changes: broadcast::Sender<ChangeSignal>,
    writes: Mutex<Vec<(&'static str, Value)>>,
}

impl MockRemote {
    fn new() -> Arc<Self> {
        let (changes, _) = broadcast::channel(16);
        Arc::new(Self {
            rows: Mutex::new(HashMap::new()),
            fetch_counts: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
            changes,
            writes: Mutex::new(Vec::new()),
        })
    }

    fn set_rows(&self, collection: Collection, rows: Vec<Value>) {
        self.rows.lock().unwrap().insert(collection.table(), rows);
    }

    fn fetches(&self, collection: Collection) -> usize {
        *self
            .fetch_counts
            .lock()
            .unwrap()
            .get(collection.table())
            .unwrap_or(&0)
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn signal_change(&self) {
        let _ = self.changes.send(ChangeSignal);
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn fetch(&self, collection: Collection, limit: Option<u32>) -> RemoteResult<Vec<Value>> {
        *self
            .fetch_counts
            .lock()
            .unwrap()
            .entry(collection.table())
            .or_insert(0) += 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        let mut rows = self
            .rows
            .lock()
            .unwrap()
            .get(collection.table())
            .cloned()
            .unwrap_or_default();
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, row: Value) -> RemoteResult<()> {
        self.writes.lock().unwrap().push((collection.table(), row));
        Ok(())
    }

    async fn update(&self, collection: Collection, _id: &str, patch: Value) -> RemoteResult<()> {
        self.writes.lock().unwrap().push((collection.table(), patch));
        Ok(())
    }

    async fn delete(&self, _collection: Collection, _id: &str) -> RemoteResult<()> {
        Ok(())
    }

    async fn delete_all(&self, _collection: Collection) -> RemoteResult<()> {
        Ok(())
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<ChangeSignal> {
        self.changes.subscribe()
    }
}

fn test_config(static_ttl: Duration) -> Config {
    Config {
        remote_url: "https://mock.invalid".into(),
        remote_key: "mock-key-0123456789".into(),
        data_dir: ".".into(),
        static_ttl,
        poll_interval: Duration::from_millis(5000),
    }
}

fn barrel_row(id: &str, code: &str) -> Value {
    json!({
        "id": id, "code": code, "capacity": 50.0, "beer_type": "Stout",
        "status": "llenado", "last_location_id": "loc-1",
        "last_location_name": "Bodega Principal",
        "last_update": "2024-05-01T10:00:00.000Z",
        "created_at": "2024-04-01T10:00:00.000Z"
    })
}

#[tokio::test]
async fn startup_refresh_hydrates_the_cache_from_the_remote() {
    let remote = MockRemote::new();
    remote.set_rows(Collection::Barrels, vec![barrel_row("rb-1", "BRL-101")]);
    remote.set_rows(
        Collection::Locations,
        vec![json!({"id": "loc-1", "name": "Bodega Principal", "address": "x", "lat": "0", "lng": "0"})],
    );

    let store = BarrelStore::open_with(
        &test_config(Duration::from_secs(300)),
        Mirror::open_in_memory().unwrap(),
        RemoteGate::with_store(remote.clone()),
    )
    .unwrap();
    store.start().await;

    let barrels = store.barrels();
    assert_eq!(barrels.len(), 1);
    assert_eq!(barrels[0].code, "BRL-101");
    assert_eq!(store.locations().len(), 1);
    // Remote mode never seeds starter data
    assert!(store.recipes().is_empty());
}

#[tokio::test]
async fn static_tier_is_fetched_once_per_ttl_window() {
    let remote = MockRemote::new();
    let cache = Arc::new(EntityCache::new());
    let gate = Arc::new(RemoteGate::with_store(remote.clone()));
    let sync = Synchronizer::new(
        cache,
        Mirror::open_in_memory().unwrap(),
        gate,
        Duration::from_secs(300),
    );

    sync.refresh_all().await;
    sync.refresh_all().await;

    // Critical tier goes out every time, static tier only once
    assert_eq!(remote.fetches(Collection::Barrels), 2);
    assert_eq!(remote.fetches(Collection::Notifications), 2);
    assert_eq!(remote.fetches(Collection::Locations), 1);
    assert_eq!(remote.fetches(Collection::Recipes), 1);

    sync.invalidate_static_tier();
    sync.refresh_all().await;
    assert_eq!(remote.fetches(Collection::Locations), 2);
}

#[tokio::test]
async fn zero_ttl_refetches_the_static_tier_every_time() {
    let remote = MockRemote::new();
    let cache = Arc::new(EntityCache::new());
    let gate = Arc::new(RemoteGate::with_store(remote.clone()));
    let sync = Synchronizer::new(
        cache,
        Mirror::open_in_memory().unwrap(),
        gate,
        Duration::ZERO,
    );

    sync.refresh_all().await;
    sync.refresh_all().await;
    assert_eq!(remote.fetches(Collection::Locations), 2);
}

#[tokio::test]
async fn critical_refresh_never_touches_the_static_tier() {
    let remote = MockRemote::new();
    let cache = Arc::new(EntityCache::new());
    let gate = Arc::new(RemoteGate::with_store(remote.clone()));
    let sync = Synchronizer::new(
        cache,
        Mirror::open_in_memory().unwrap(),
        gate,
        Duration::ZERO,
    );

    sync.refresh_critical().await;
    sync.refresh_critical().await;

    assert_eq!(remote.fetches(Collection::Barrels), 2);
    assert_eq!(remote.fetches(Collection::Locations), 0);
}

#[tokio::test]
async fn failed_refresh_keeps_the_last_good_snapshot() {
    let remote = MockRemote::new();
    remote.set_rows(Collection::Barrels, vec![barrel_row("rb-1", "BRL-101")]);

    let cache = Arc::new(EntityCache::new());
    let gate = Arc::new(RemoteGate::with_store(remote.clone()));
    let sync = Synchronizer::new(
        cache.clone(),
        Mirror::open_in_memory().unwrap(),
        gate,
        Duration::from_secs(300),
    );

    sync.refresh_all().await;
    assert_eq!(cache.barrels().len(), 1);

    remote.set_failing(true);
    sync.refresh_all().await;

    // Stale-but-available: the cache still serves the old rows
    assert_eq!(cache.barrels().len(), 1);
    assert_eq!(cache.barrels()[0].code, "BRL-101");
}

#[tokio::test]
async fn malformed_remote_rows_are_dropped_not_fatal() {
    let remote = MockRemote::new();
    remote.set_rows(
        Collection::Barrels,
        vec![barrel_row("rb-1", "BRL-101"), json!({"id": 42, "capacity": "x"})],
    );

    let cache = Arc::new(EntityCache::new());
    let gate = Arc::new(RemoteGate::with_store(remote.clone()));
    let sync = Synchronizer::new(
        cache.clone(),
        Mirror::open_in_memory().unwrap(),
        gate,
        Duration::from_secs(300),
    );
    sync.refresh_all().await;

    assert_eq!(cache.barrels().len(), 1);
    assert_eq!(cache.barrels()[0].code, "BRL-101");
}

#[tokio::test]
async fn change_signal_triggers_a_critical_refresh() {
    let remote = MockRemote::new();
    let store = BarrelStore::open_with(
        &test_config(Duration::from_secs(300)),
        Mirror::open_in_memory().unwrap(),
        RemoteGate::with_store(remote.clone()),
    )
    .unwrap();
    store.start().await;
    let after_start = remote.fetches(Collection::Barrels);

    remote.set_rows(Collection::Barrels, vec![barrel_row("rb-9", "BRL-900")]);
    remote.signal_change();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(remote.fetches(Collection::Barrels) > after_start);
    assert_eq!(store.barrels()[0].code, "BRL-900");
    // Static tier stays quiet on realtime signals
    assert_eq!(remote.fetches(Collection::Locations), 1);
}

#[tokio::test]
async fn remote_mutations_push_rows_and_refresh() {
    let remote = MockRemote::new();
    let store = BarrelStore::open_with(
        &test_config(Duration::from_secs(300)),
        Mirror::open_in_memory().unwrap(),
        RemoteGate::with_store(remote.clone()),
    )
    .unwrap();
    store.start().await;

    store
        .add_batch(shared::models::BatchCreate {
            fermenter_name: "TANK-07".into(),
            beer_type: shared::models::BeerType::Calafate,
            total_liters: 800.0,
            filling_date: None,
        })
        .await
        .unwrap();

    let writes = remote.writes.lock().unwrap();
    let (table, row) = writes.iter().find(|(t, _)| *t == "batches").unwrap();
    assert_eq!(*table, "batches");
    assert_eq!(row["fermenter_name"], json!("TANK-07"));
    assert_eq!(row["remaining_liters"], json!(800.0));
    assert_eq!(row["status"], json!("fermentando"));
}

#[tokio::test]
async fn outage_writes_notify_subscribers_and_survive_a_restart() {
    let remote = MockRemote::new();
    let mirror = Mirror::open_in_memory().unwrap();
    let store = BarrelStore::open_with(
        &test_config(Duration::from_secs(300)),
        mirror.clone(),
        RemoteGate::with_store(remote.clone()),
    )
    .unwrap();
    store.start().await;

    remote.set_failing(true);
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let _sub = store.subscribe(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });

    store.add_comment("rb-1", "sin conexión").await.unwrap();

    // The acknowledged write fans out even though every remote call failed
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(store.comments("rb-1").len(), 1);

    // A restart during the outage reloads the write from the mirror
    drop(store);
    let store = BarrelStore::open_with(
        &test_config(Duration::from_secs(300)),
        mirror,
        RemoteGate::with_store(remote.clone()),
    )
    .unwrap();
    assert_eq!(store.comments("rb-1")[0].content, "sin conexión");
}

#[tokio::test]
async fn remote_write_failure_keeps_the_optimistic_state() {
    let remote = MockRemote::new();
    let store = BarrelStore::open_with(
        &test_config(Duration::from_secs(300)),
        Mirror::open_in_memory().unwrap(),
        RemoteGate::with_store(remote.clone()),
    )
    .unwrap();
    store.start().await;

    // Every subsequent fetch fails; writes still resolve without error and
    // the caller sees the optimistic row
    remote.set_failing(true);
    let batch = store
        .add_batch(shared::models::BatchCreate {
            fermenter_name: "TANK-08".into(),
            beer_type: shared::models::BeerType::Stout,
            total_liters: 500.0,
            filling_date: None,
        })
        .await
        .unwrap();

    assert!(store.batches().iter().any(|b| b.id == batch.id));
}
