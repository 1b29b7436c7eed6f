//! BarrelTrack engine
//!
//! Entity cache and synchronization engine for the Bullbier barrel tracking
//! system. Holds every entity collection in memory for synchronous reads,
//! mirrors the last known-good snapshot to a local redb database, and — when
//! remote credentials are configured — keeps the cache converging on a
//! PostgREST-style remote data service with tiered refreshes and realtime
//! invalidation.
//!
//! Entry point is [`BarrelStore`]:
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use barrel_engine::{BarrelStore, Config};
//!
//! let store = BarrelStore::open(&Config::from_env())?;
//! store.start().await;
//!
//! let barrels = store.barrels();
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logger;
pub mod mirror;
pub mod realtime;
pub mod remote;
pub mod seed;
pub mod store;
pub mod sync;

pub use cache::{Collection, EntityCache, Subscription};
pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use mirror::Mirror;
pub use remote::{RemoteGate, RemoteStore};
pub use store::BarrelStore;
pub use sync::Synchronizer;
