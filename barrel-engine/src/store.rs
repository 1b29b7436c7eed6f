//! Consumer-facing Store API
//!
//! The single entry point for host applications. Reads are synchronous
//! snapshots from the entity cache; writes mutate the cache first, then
//! commit through whichever backend the remote gate resolved at startup:
//!
//! * local-only — persist the touched collections to the mirror
//! * remote — push the row operations, then refresh so the cache converges
//!   on what the remote actually accepted
//!
//! Remote push failures are logged and swallowed; the caller already sees
//! the optimistic local state and the next successful refresh reconciles.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use shared::models::{
    Activity, Barrel, BarrelCreate, Batch, BatchCreate, BatchStatus, BreweryEvent, Comment,
    EventCreate, EventUpdate, Location, LocationCreate, LocationUpdate, Notification, Recipe,
    RecipeCreate, Severity, StatusChange, UserSession, session,
};
use shared::util;

use crate::cache::{Collection, EntityCache, Subscription};
use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::lifecycle;
use crate::mirror::Mirror;
use crate::realtime::spawn_invalidation_listener;
use crate::remote::{RemoteGate, wire};
use crate::sync::Synchronizer;
use crate::{audit_log, seed};

const MIRROR_FILE: &str = "barreltrack.redb";

/// A single remote row operation produced by a mutation.
enum RowOp {
    Insert(Collection, Value),
    Update(Collection, String, Value),
    Delete(Collection, String),
    DeleteAll(Collection),
}

/// Barrel tracking store: entity cache, local mirror and remote
/// synchronization behind one API.
pub struct BarrelStore {
    cache: Arc<EntityCache>,
    mirror: Mirror,
    gate: Arc<RemoteGate>,
    sync: Arc<Synchronizer>,
}

impl BarrelStore {
    /// Open the store: resolve the remote gate, open the mirror and restore
    /// the last known-good snapshot into the cache. In local-only mode an
    /// empty mirror is seeded with the starter data set.
    pub fn open(config: &Config) -> StoreResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let mirror = Mirror::open(Path::new(&config.data_dir).join(MIRROR_FILE))?;
        let gate = Arc::new(RemoteGate::resolve(config));
        Self::assemble(config, mirror, gate)
    }

    /// Open with an in-memory mirror and an explicit gate (tests).
    pub fn open_with(config: &Config, mirror: Mirror, gate: RemoteGate) -> StoreResult<Self> {
        Self::assemble(config, mirror, Arc::new(gate))
    }

    fn assemble(config: &Config, mirror: Mirror, gate: Arc<RemoteGate>) -> StoreResult<Self> {
        let cache = Arc::new(EntityCache::new());

        let mut data = match mirror.restore() {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "Mirror restore failed; starting from empty cache");
                Default::default()
            }
        };

        if !gate.is_present() && data.is_empty() {
            tracing::info!("Empty mirror in local-only mode; seeding starter data");
            data = seed::initial_collections();
            mirror.persist(&data, &Collection::ALL)?;
        }

        cache.replace(data);

        let sync = Arc::new(Synchronizer::new(
            cache.clone(),
            mirror.clone(),
            gate.clone(),
            config.static_ttl,
        ));

        Ok(Self {
            cache,
            mirror,
            gate,
            sync,
        })
    }

    /// Run the startup refresh and start realtime invalidation. Requires a
    /// tokio runtime; call once after `open`.
    pub async fn start(&self) {
        self.sync.refresh_all().await;
        if spawn_invalidation_listener(&self.gate, self.sync.clone()) {
            tracing::info!("Realtime invalidation listener running");
        }
    }

    // ========== Read API ==========

    pub fn barrels(&self) -> Vec<Barrel> {
        self.cache.barrels()
    }

    pub fn barrel(&self, id: &str) -> Option<Barrel> {
        self.cache.barrel(id)
    }

    pub fn locations(&self) -> Vec<Location> {
        self.cache.locations()
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.cache.batches()
    }

    pub fn activities(&self, limit: Option<usize>) -> Vec<Activity> {
        self.cache.activities(limit)
    }

    pub fn events(&self) -> Vec<BreweryEvent> {
        self.cache.events()
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.cache.recipes()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.cache.notifications()
    }

    pub fn comments(&self, barrel_id: &str) -> Vec<Comment> {
        self.cache.comments_for(barrel_id)
    }

    /// Register a change observer. Observers get no payload; they re-read
    /// through the getters.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        Arc::clone(&self.cache).subscribe(callback)
    }

    /// Point-in-time JSON snapshot handed to the conversational-assistant
    /// service. Activities are bounded to the recent tail.
    pub fn assistant_snapshot(&self) -> Value {
        serde_json::json!({
            "barrels": self.cache.barrels(),
            "locations": self.cache.locations(),
            "batches": self.cache.batches(),
            "activities": self.cache.activities(Some(30)),
            "recipes": self.cache.recipes(),
            "events": self.cache.events(),
        })
    }

    // ========== Session / theme ==========

    /// Display name of the current user, or the fixed placeholder when no
    /// session is stored.
    pub fn current_user_name(&self) -> String {
        match self.mirror.load_session() {
            Ok(Some(user)) => user.name,
            Ok(None) => session::DEFAULT_USER_NAME.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load session; using placeholder user");
                session::DEFAULT_USER_NAME.to_string()
            }
        }
    }

    pub fn current_session(&self) -> StoreResult<Option<UserSession>> {
        Ok(self.mirror.load_session()?)
    }

    pub fn save_session(&self, user: &UserSession) -> StoreResult<()> {
        Ok(self.mirror.save_session(user)?)
    }

    pub fn clear_session(&self) -> StoreResult<()> {
        Ok(self.mirror.clear_session()?)
    }

    pub fn theme(&self) -> StoreResult<Option<String>> {
        Ok(self.mirror.load_theme()?)
    }

    pub fn set_theme(&self, theme: &str) -> StoreResult<()> {
        Ok(self.mirror.save_theme(theme)?)
    }

    // ========== Write API ==========

    pub async fn add_barrel(&self, payload: BarrelCreate) -> StoreResult<Barrel> {
        let user = self.current_user_name();
        let outcome = self
            .cache
            .with_mut(|data| lifecycle::register_barrel(data, payload, &user));

        let ops = vec![
            RowOp::Insert(Collection::Barrels, wire::barrel_to_wire(&outcome.barrel)),
            RowOp::Insert(
                Collection::Activities,
                wire::activity_to_wire(&outcome.activity),
            ),
            RowOp::Insert(
                Collection::Notifications,
                wire::notification_to_wire(&outcome.notification),
            ),
        ];
        self.commit(
            &[
                Collection::Barrels,
                Collection::Activities,
                Collection::Notifications,
            ],
            ops,
        )
        .await?;

        audit_log!(&user, "add_barrel", &format!("barrel:{}", outcome.barrel.code));
        Ok(outcome.barrel)
    }

    pub async fn delete_barrel(&self, id: &str) -> StoreResult<()> {
        let user = self.current_user_name();
        let (code, touched_events, comment_ids) = self.cache.with_mut(|data| {
            let idx = data
                .barrels
                .iter()
                .position(|b| b.id == id)
                .ok_or(StoreError::NotFound("Barrel"))?;
            let code = data.barrels.remove(idx).code;

            let mut touched = Vec::new();
            for event in data.events.iter_mut() {
                let before = event.barrel_ids.len();
                event.barrel_ids.retain(|b| b != id);
                if event.barrel_ids.len() != before {
                    touched.push(event.clone());
                }
            }

            let comment_ids: Vec<String> = data
                .comments
                .iter()
                .filter(|c| c.barrel_id == id)
                .map(|c| c.id.clone())
                .collect();
            data.comments.retain(|c| c.barrel_id != id);

            Ok::<_, StoreError>((code, touched, comment_ids))
        })?;

        let mut ops = vec![RowOp::Delete(Collection::Barrels, id.to_string())];
        for event in &touched_events {
            ops.push(RowOp::Update(
                Collection::Events,
                event.id.clone(),
                wire::event_to_wire(event),
            ));
        }
        for comment_id in comment_ids {
            ops.push(RowOp::Delete(Collection::Comments, comment_id));
        }
        self.commit(
            &[Collection::Barrels, Collection::Events, Collection::Comments],
            ops,
        )
        .await?;

        audit_log!(&user, "delete_barrel", &format!("barrel:{code}"));
        Ok(())
    }

    /// Apply a lifecycle transition. Preconditions (fill guard, unknown
    /// barrel) are rejected before any mutation.
    pub async fn set_barrel_status(
        &self,
        barrel_id: &str,
        change: StatusChange,
    ) -> StoreResult<Barrel> {
        let user = self.current_user_name();
        let outcome = self
            .cache
            .with_mut(|data| lifecycle::apply_status_change(data, barrel_id, &change, &user))?;

        let mut touched = vec![Collection::Barrels, Collection::Activities];
        let mut ops = vec![
            RowOp::Update(
                Collection::Barrels,
                outcome.barrel.id.clone(),
                wire::barrel_to_wire(&outcome.barrel),
            ),
            RowOp::Insert(
                Collection::Activities,
                wire::activity_to_wire(&outcome.activity),
            ),
        ];
        if let Some(batch) = &outcome.debited_batch {
            touched.push(Collection::Batches);
            ops.push(RowOp::Update(
                Collection::Batches,
                batch.id.clone(),
                wire::batch_to_wire(batch),
            ));
        }
        if let Some(notification) = &outcome.notification {
            touched.push(Collection::Notifications);
            ops.push(RowOp::Insert(
                Collection::Notifications,
                wire::notification_to_wire(notification),
            ));
        }
        if !outcome.touched_events.is_empty() {
            touched.push(Collection::Events);
            for event in &outcome.touched_events {
                ops.push(RowOp::Update(
                    Collection::Events,
                    event.id.clone(),
                    wire::event_to_wire(event),
                ));
            }
        }
        self.commit(&touched, ops).await?;

        audit_log!(
            &user,
            "set_status",
            &format!("barrel:{}", outcome.barrel.code),
            outcome.barrel.status.label()
        );
        Ok(outcome.barrel)
    }

    pub async fn add_location(&self, payload: LocationCreate) -> StoreResult<Location> {
        let location = Location {
            id: util::entity_id(),
            name: payload.name,
            address: payload.address,
            lat: payload.lat.unwrap_or_else(|| "-33.44".into()),
            lng: payload.lng.unwrap_or_else(|| "-70.66".into()),
            barrel_count: None,
        };
        self.cache
            .with_mut(|data| data.locations.push(location.clone()));

        self.commit(
            &[Collection::Locations],
            vec![RowOp::Insert(
                Collection::Locations,
                wire::location_to_wire(&location),
            )],
        )
        .await?;
        Ok(location)
    }

    /// Partial update. A name change also rewrites the denormalized
    /// location name on every barrel currently at this location.
    pub async fn update_location(
        &self,
        id: &str,
        updates: LocationUpdate,
    ) -> StoreResult<Location> {
        let (location, renamed_barrels) = self.cache.with_mut(|data| {
            let location = data
                .locations
                .iter_mut()
                .find(|l| l.id == id)
                .ok_or(StoreError::NotFound("Location"))?;
            if let Some(name) = updates.name.clone() {
                location.name = name;
            }
            if let Some(address) = updates.address {
                location.address = address;
            }
            if let Some(lat) = updates.lat {
                location.lat = lat;
            }
            if let Some(lng) = updates.lng {
                location.lng = lng;
            }
            let location = location.clone();

            let mut renamed = Vec::new();
            if let Some(name) = &updates.name {
                for barrel in data
                    .barrels
                    .iter_mut()
                    .filter(|b| b.last_location_id.as_deref() == Some(id))
                {
                    barrel.last_location_name = Some(name.clone());
                    renamed.push(barrel.id.clone());
                }
            }
            Ok::<_, StoreError>((location, renamed))
        })?;

        let mut touched = vec![Collection::Locations];
        let mut ops = vec![RowOp::Update(
            Collection::Locations,
            location.id.clone(),
            wire::location_to_wire(&location),
        )];
        if !renamed_barrels.is_empty() {
            touched.push(Collection::Barrels);
            for barrel_id in renamed_barrels {
                ops.push(RowOp::Update(
                    Collection::Barrels,
                    barrel_id,
                    serde_json::json!({ "last_location_name": location.name }),
                ));
            }
        }
        self.commit(&touched, ops).await?;
        Ok(location)
    }

    /// Delete a location. Rejected while any barrel is assigned to it.
    pub async fn delete_location(&self, id: &str) -> StoreResult<()> {
        self.cache.with_mut(|data| {
            let assigned = data
                .barrels
                .iter()
                .any(|b| b.last_location_id.as_deref() == Some(id));
            if assigned {
                return Err(StoreError::Precondition(
                    "No se puede eliminar una ubicación con barriles asignados.".into(),
                ));
            }
            let idx = data
                .locations
                .iter()
                .position(|l| l.id == id)
                .ok_or(StoreError::NotFound("Location"))?;
            data.locations.remove(idx);
            Ok(())
        })?;

        self.commit(
            &[Collection::Locations],
            vec![RowOp::Delete(Collection::Locations, id.to_string())],
        )
        .await
    }

    pub async fn add_batch(&self, payload: BatchCreate) -> StoreResult<Batch> {
        let batch = Batch {
            id: util::entity_id(),
            fermenter_name: payload.fermenter_name,
            beer_type: payload.beer_type,
            total_liters: payload.total_liters,
            remaining_liters: payload.total_liters,
            filling_date: payload.filling_date.unwrap_or_else(util::today),
            status: BatchStatus::Fermenting,
            created_at: util::now_iso(),
        };
        self.cache.with_mut(|data| data.batches.push(batch.clone()));

        self.commit(
            &[Collection::Batches],
            vec![RowOp::Insert(
                Collection::Batches,
                wire::batch_to_wire(&batch),
            )],
        )
        .await?;
        Ok(batch)
    }

    pub async fn add_recipe(&self, payload: RecipeCreate) -> StoreResult<Recipe> {
        let recipe = Recipe {
            id: util::entity_id(),
            name: payload.name.unwrap_or_else(|| "Nueva Receta".into()),
            description: payload.description.unwrap_or_default(),
            ingredients: payload.ingredients.unwrap_or_default(),
            steps: payload.steps.unwrap_or_default(),
        };
        self.cache.with_mut(|data| data.recipes.push(recipe.clone()));

        self.commit(
            &[Collection::Recipes],
            vec![RowOp::Insert(
                Collection::Recipes,
                wire::recipe_to_wire(&recipe),
            )],
        )
        .await?;
        Ok(recipe)
    }

    /// Create an event and notify about it.
    pub async fn add_event(&self, payload: EventCreate) -> StoreResult<BreweryEvent> {
        let event = BreweryEvent {
            id: util::entity_id(),
            name: payload.name.unwrap_or_else(|| "Nuevo Evento".into()),
            date: payload.date.unwrap_or_else(util::today),
            notes: payload.notes.unwrap_or_default(),
            barrel_ids: payload.barrel_ids.unwrap_or_default(),
            checklist: payload.checklist.unwrap_or_default(),
        };
        let notification = Notification::new(
            "Evento Programado",
            format!(
                "Se ha creado el evento \"{}\" para el día {}.",
                event.name, event.date
            ),
            Severity::Info,
        );
        self.cache.with_mut(|data| {
            data.events.push(event.clone());
            lifecycle::push_notification(data, notification.clone());
        });

        self.commit(
            &[Collection::Events, Collection::Notifications],
            vec![
                RowOp::Insert(Collection::Events, wire::event_to_wire(&event)),
                RowOp::Insert(
                    Collection::Notifications,
                    wire::notification_to_wire(&notification),
                ),
            ],
        )
        .await?;
        Ok(event)
    }

    /// Partial update; `None` fields keep their value.
    pub async fn update_event(&self, id: &str, updates: EventUpdate) -> StoreResult<BreweryEvent> {
        let event = self.cache.with_mut(|data| {
            let event = data
                .events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(StoreError::NotFound("Event"))?;
            if let Some(name) = updates.name {
                event.name = name;
            }
            if let Some(date) = updates.date {
                event.date = date;
            }
            if let Some(notes) = updates.notes {
                event.notes = notes;
            }
            if let Some(barrel_ids) = updates.barrel_ids {
                event.barrel_ids = barrel_ids;
            }
            if let Some(checklist) = updates.checklist {
                event.checklist = checklist;
            }
            Ok::<_, StoreError>(event.clone())
        })?;

        self.commit(
            &[Collection::Events],
            vec![RowOp::Update(
                Collection::Events,
                event.id.clone(),
                wire::event_to_wire(&event),
            )],
        )
        .await?;
        Ok(event)
    }

    pub async fn add_comment(&self, barrel_id: &str, content: &str) -> StoreResult<Comment> {
        let user = self.current_user_name();
        let comment = Comment {
            id: util::entity_id(),
            barrel_id: barrel_id.to_string(),
            user_name: user,
            content: content.to_string(),
            created_at: util::now_iso(),
        };
        self.cache
            .with_mut(|data| data.comments.push(comment.clone()));

        self.commit(
            &[Collection::Comments],
            vec![RowOp::Insert(
                Collection::Comments,
                wire::comment_to_wire(&comment),
            )],
        )
        .await?;
        Ok(comment)
    }

    /// Mark one notification read. Unknown ids are ignored.
    pub async fn mark_notification_read(&self, id: &str) -> StoreResult<()> {
        let found = self.cache.with_mut(|data| {
            match data.notifications.iter_mut().find(|n| n.id == id) {
                Some(notification) => {
                    notification.read = true;
                    true
                }
                None => false,
            }
        });
        if !found {
            return Ok(());
        }

        self.commit(
            &[Collection::Notifications],
            vec![RowOp::Update(
                Collection::Notifications,
                id.to_string(),
                serde_json::json!({ "read": true }),
            )],
        )
        .await
    }

    pub async fn clear_notifications(&self) -> StoreResult<()> {
        self.cache.with_mut(|data| data.notifications.clear());
        self.commit(
            &[Collection::Notifications],
            vec![RowOp::DeleteAll(Collection::Notifications)],
        )
        .await
    }

    // ========== Commit plumbing ==========

    /// Persist a completed cache mutation.
    ///
    /// Local-only: write the touched collections to the mirror and notify.
    /// Remote: persist the optimistic snapshot first (an acknowledged write
    /// must survive a restart during an outage), push each row operation
    /// (failures logged, not propagated so the optimistic state keeps
    /// serving), then run a refresh — which notifies subscribers whether or
    /// not any fetch landed.
    async fn commit(&self, touched: &[Collection], ops: Vec<RowOp>) -> StoreResult<()> {
        match self.gate.store() {
            None => {
                self.mirror.persist(&self.cache.snapshot(), touched)?;
                self.cache.notify_subscribers();
            }
            Some(remote) => {
                self.mirror.persist(&self.cache.snapshot(), touched)?;
                for op in ops {
                    let result = match &op {
                        RowOp::Insert(collection, row) => {
                            remote.insert(*collection, row.clone()).await
                        }
                        RowOp::Update(collection, id, patch) => {
                            remote.update(*collection, id, patch.clone()).await
                        }
                        RowOp::Delete(collection, id) => remote.delete(*collection, id).await,
                        RowOp::DeleteAll(collection) => remote.delete_all(*collection).await,
                    };
                    if let Err(e) = result {
                        let collection = match &op {
                            RowOp::Insert(c, _)
                            | RowOp::Update(c, _, _)
                            | RowOp::Delete(c, _)
                            | RowOp::DeleteAll(c) => *c,
                        };
                        tracing::warn!(
                            table = collection.table(),
                            error = %e,
                            "Remote write failed; cache keeps optimistic state"
                        );
                    }
                }
                self.sync.refresh_all().await;
            }
        }
        Ok(())
    }
}
