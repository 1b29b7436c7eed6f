//! Location Model

use serde::{Deserialize, Serialize};

/// Location entity (warehouse, depot, bar, ...).
///
/// `barrel_count` is derived from the barrel collection at read time and is
/// never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: String,
    pub lng: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrel_count: Option<usize>,
}

/// Create location payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCreate {
    pub name: String,
    pub address: String,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// Update location payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}
