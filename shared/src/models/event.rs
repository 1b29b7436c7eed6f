//! Brewery Event Model

use serde::{Deserialize, Serialize};

/// Checklist item for event preparation (ice, cups, taps, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub name: String,
    pub checked: bool,
}

/// Brewery event entity.
///
/// `barrel_ids` is maintained by the lifecycle module: a barrel entering
/// `AtEvent` with an event id is detached from every other event first.
/// Nothing structurally prevents an externally-written overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreweryEvent {
    pub id: String,
    pub name: String,
    /// Event date, `YYYY-MM-DD`.
    pub date: String,
    pub notes: String,
    #[serde(default)]
    pub barrel_ids: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

/// Create event payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventCreate {
    pub name: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
    pub barrel_ids: Option<Vec<String>>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

/// Update event payload (partial; `None` fields keep their value).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
    pub barrel_ids: Option<Vec<String>>,
    pub checklist: Option<Vec<ChecklistItem>>,
}
