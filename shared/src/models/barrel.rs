//! Barrel Model
//!
//! A barrel is the central tracked asset. Its `status` field is the state
//! machine variable driven by the lifecycle module in the engine crate.

use serde::{Deserialize, Serialize};

/// Barrel lifecycle status.
///
/// Serialized values match the legacy column values used by the remote
/// service (Spanish snake_case). `Retired` is conventional-only: nothing
/// structurally prevents a further transition out of it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BarrelStatus {
    /// Clean, sitting in the warehouse. Initial state for new barrels.
    #[default]
    #[serde(rename = "en_bodega_limpio")]
    CleanInWarehouse,
    /// Returned dirty, awaiting cleaning.
    #[serde(rename = "en_bodega_sucio")]
    DirtyInWarehouse,
    /// Filled from a production batch.
    #[serde(rename = "llenado")]
    Filled,
    /// On a truck.
    #[serde(rename = "en_transito")]
    InTransit,
    /// Delivered to a customer location.
    #[serde(rename = "entregado")]
    Delivered,
    /// Deployed at a brewery event.
    #[serde(rename = "en_evento")]
    AtEvent,
    /// Taken out of rotation.
    #[serde(rename = "retirado")]
    Retired,
    /// Stored at a third-party depot.
    #[serde(rename = "en_deposito_externo")]
    AtExternalDepot,
}

impl BarrelStatus {
    /// Human-readable label (used in notification messages).
    pub fn label(&self) -> &'static str {
        match self {
            Self::CleanInWarehouse => "Bodega (Limpio)",
            Self::DirtyInWarehouse => "Bodega (Sucio)",
            Self::Filled => "Llenado",
            Self::InTransit => "En Tránsito",
            Self::Delivered => "Entregado",
            Self::AtEvent => "En Evento",
            Self::Retired => "Retirado",
            Self::AtExternalDepot => "Depósito Externo",
        }
    }
}

/// Beer styles brewed by the house.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BeerType {
    #[default]
    #[serde(rename = "Golden Ale")]
    GoldenAle,
    #[serde(rename = "Ambar Ale")]
    AmbarAle,
    #[serde(rename = "Stout")]
    Stout,
    #[serde(rename = "Calafate")]
    Calafate,
    #[serde(rename = "Calafate Syrup")]
    CalafateSyrup,
    #[serde(rename = "Frambuesa")]
    Frambuesa,
    #[serde(rename = "Maqui Berry")]
    MaquiBerry,
    #[serde(rename = "Cafe Mocca-Miel")]
    CafeMoccaMiel,
    #[serde(rename = "Mango")]
    Mango,
}

/// Barrel entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barrel {
    pub id: String,
    /// Human label printed on the barrel (unique, e.g. "BRL-001").
    pub code: String,
    /// Capacity in liters. Debited from a batch ledger on fill.
    pub capacity: f64,
    pub beer_type: BeerType,
    pub status: BarrelStatus,
    pub last_location_id: Option<String>,
    pub last_location_name: Option<String>,
    pub last_update: String,
    pub created_at: String,
}

/// Create barrel payload. Every field is optional; the engine fills
/// defaults (next free code, 50 L, Golden Ale, clean-in-warehouse).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BarrelCreate {
    pub code: Option<String>,
    pub capacity: Option<f64>,
    pub beer_type: Option<BeerType>,
    pub status: Option<BarrelStatus>,
    pub location_id: Option<String>,
}

/// Context accompanying a status transition.
///
/// `new_status: None` means "no status change" — the other fields may still
/// update the barrel (e.g. relocating without changing state).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusChange {
    pub new_status: Option<BarrelStatus>,
    pub location_id: Option<String>,
    pub beer_type: Option<BeerType>,
    /// Required when transitioning to `Filled`.
    pub batch_id: Option<String>,
    /// Attaches the barrel to an event when transitioning to `AtEvent`.
    pub event_id: Option<String>,
    pub notes: Option<String>,
}
