//! Notification Model

use serde::{Deserialize, Serialize};

use crate::util;

/// Notification severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Success,
}

/// User-facing alert. Transient: the engine keeps at most
/// [`Notification::CAP`] entries and trims the oldest beyond that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub created_at: String,
    pub read: bool,
}

impl Notification {
    /// Maximum retained notifications; oldest are dropped beyond this.
    pub const CAP: usize = 50;

    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: util::entity_id(),
            title: title.into(),
            message: message.into(),
            severity,
            created_at: util::now_iso(),
            read: false,
        }
    }
}
