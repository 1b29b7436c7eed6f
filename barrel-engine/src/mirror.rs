//! redb-based local persistent mirror
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `snapshots` | collection key | JSON bytes | Last known-good collection snapshot |
//! | `kv` | `"bt_session"` / `"bt_theme"` | JSON bytes | Session + display-theme preference |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate` by default: copy-on-write with
//! an atomic pointer swap, so the file is always in a consistent state.
//! Snapshots are overwritten wholesale; a restart that catches a torn write
//! simply re-synchronizes from the remote service when one is configured.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::UserSession;
use thiserror::Error;

use crate::cache::{Collection, Collections};

/// Collection snapshots: key = collection key, value = JSON-serialized Vec.
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

/// Small key-value surface for non-collection state.
const KV_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

const SESSION_KEY: &str = "bt_session";
const THEME_KEY: &str = "bt_theme";

/// Mirror errors
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type MirrorResult<T> = Result<T, MirrorError>;

/// Local persistent mirror backed by redb.
///
/// Holds the last known-good snapshot of every entity collection so the
/// engine can serve reads across restarts without the remote service.
#[derive(Clone)]
pub struct Mirror {
    db: Arc<Database>,
}

impl Mirror {
    /// Open or create the mirror database at the given path.
    pub fn open(path: impl AsRef<Path>) -> MirrorResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory mirror (tests, ephemeral sessions).
    pub fn open_in_memory() -> MirrorResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> MirrorResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = write_txn.open_table(KV_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    // ========== Collection snapshots ==========

    /// Overwrite one collection snapshot.
    pub fn save<T: Serialize>(&self, collection: Collection, value: &[T]) -> MirrorResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SNAPSHOTS_TABLE)?;
            table.insert(collection.key(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load one collection snapshot. Missing key yields an empty Vec.
    pub fn load<T: DeserializeOwned>(&self, collection: Collection) -> MirrorResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;
        match table.get(collection.key())? {
            Some(guard) => Ok(serde_json::from_slice(guard.value())?),
            None => Ok(Vec::new()),
        }
    }

    /// Persist the touched collections from a full in-memory snapshot.
    pub fn persist(&self, data: &Collections, touched: &[Collection]) -> MirrorResult<()> {
        for collection in touched {
            match collection {
                Collection::Barrels => self.save(*collection, &data.barrels)?,
                Collection::Locations => self.save(*collection, &data.locations)?,
                Collection::Batches => self.save(*collection, &data.batches)?,
                Collection::Activities => self.save(*collection, &data.activities)?,
                Collection::Events => self.save(*collection, &data.events)?,
                Collection::Recipes => self.save(*collection, &data.recipes)?,
                Collection::Notifications => self.save(*collection, &data.notifications)?,
                Collection::Comments => self.save(*collection, &data.comments)?,
            }
        }
        Ok(())
    }

    /// Restore every collection snapshot (startup path).
    pub fn restore(&self) -> MirrorResult<Collections> {
        Ok(Collections {
            barrels: self.load(Collection::Barrels)?,
            locations: self.load(Collection::Locations)?,
            batches: self.load(Collection::Batches)?,
            activities: self.load(Collection::Activities)?,
            events: self.load(Collection::Events)?,
            recipes: self.load(Collection::Recipes)?,
            notifications: self.load(Collection::Notifications)?,
            comments: self.load(Collection::Comments)?,
        })
    }

    // ========== Session / theme keys ==========

    /// Save the current user session (written by the host app's login flow).
    pub fn save_session(&self, session: &UserSession) -> MirrorResult<()> {
        self.put_kv(SESSION_KEY, session)
    }

    /// Load the current user session, if any.
    pub fn load_session(&self) -> MirrorResult<Option<UserSession>> {
        self.get_kv(SESSION_KEY)
    }

    /// Clear the current user session.
    pub fn clear_session(&self) -> MirrorResult<()> {
        self.delete_kv(SESSION_KEY)
    }

    /// Save the display-theme preference (opaque to the engine).
    pub fn save_theme(&self, theme: &str) -> MirrorResult<()> {
        self.put_kv(THEME_KEY, &theme)
    }

    /// Load the display-theme preference.
    pub fn load_theme(&self) -> MirrorResult<Option<String>> {
        self.get_kv(THEME_KEY)
    }

    fn put_kv<T: Serialize>(&self, key: &str, value: &T) -> MirrorResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.insert(key, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_kv<T: DeserializeOwned>(&self, key: &str) -> MirrorResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KV_TABLE)?;
        match table.get(key)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn delete_kv(&self, key: &str) -> MirrorResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{BarrelStatus, BeerType};
    use shared::util;

    #[test]
    fn snapshot_round_trip() {
        let mirror = Mirror::open_in_memory().unwrap();
        let barrels = vec![shared::models::Barrel {
            id: util::entity_id(),
            code: "BRL-001".into(),
            capacity: 50.0,
            beer_type: BeerType::Stout,
            status: BarrelStatus::InTransit,
            last_location_id: Some("loc-3".into()),
            last_location_name: Some("Bar Centro".into()),
            last_update: util::now_iso(),
            created_at: util::now_iso(),
        }];

        mirror.save(Collection::Barrels, &barrels).unwrap();
        let loaded: Vec<shared::models::Barrel> = mirror.load(Collection::Barrels).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].code, "BRL-001");
        assert_eq!(loaded[0].status, BarrelStatus::InTransit);
    }

    #[test]
    fn missing_collection_loads_empty() {
        let mirror = Mirror::open_in_memory().unwrap();
        let loaded: Vec<shared::models::Recipe> = mirror.load(Collection::Recipes).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn session_round_trip_and_clear() {
        let mirror = Mirror::open_in_memory().unwrap();
        assert!(mirror.load_session().unwrap().is_none());

        mirror
            .save_session(&UserSession {
                email: "op@bullbier.cl".into(),
                name: "Bullbier Premium".into(),
                role: "Admin".into(),
            })
            .unwrap();
        assert_eq!(
            mirror.load_session().unwrap().unwrap().name,
            "Bullbier Premium"
        );

        mirror.clear_session().unwrap();
        assert!(mirror.load_session().unwrap().is_none());
    }
}
