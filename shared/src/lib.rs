//! Shared types for the BarrelTrack engine
//!
//! Domain models and small utilities used by the engine crate.
//! This crate is pure data: no I/O, no async, no storage concerns.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    Activity, Barrel, BarrelCreate, BarrelStatus, Batch, BatchCreate, BatchStatus, BeerType,
    BreweryEvent, ChecklistItem, Comment, EventCreate, EventUpdate, Ingredient, Location,
    LocationCreate, LocationUpdate, Notification, Recipe, RecipeCreate, RecipeStep, Severity,
    StatusChange, UserSession,
};
