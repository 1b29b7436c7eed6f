//! Activity Model
//!
//! Append-only audit record. Exactly one activity is produced per mutating
//! operation on a barrel; the engine never edits or removes entries.

use serde::{Deserialize, Serialize};

use super::{BarrelStatus, BeerType};

/// Audit log entry for a barrel mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub barrel_id: String,
    /// Barrel code snapshot at the time of the mutation.
    pub barrel_code: String,
    /// Display name of the operator who performed the mutation.
    pub user_name: String,
    /// `None` for barrel creation.
    pub previous_status: Option<BarrelStatus>,
    pub new_status: BarrelStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beer_type: Option<BeerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}
