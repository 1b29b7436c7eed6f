//! Comment Model
//!
//! Free-text note attached to a single barrel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub barrel_id: String,
    pub user_name: String,
    pub content: String,
    pub created_at: String,
}
