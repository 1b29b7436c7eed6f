//! User Session Model
//!
//! The engine consumes sessions (for operator attribution on audit records)
//! but never produces them; login lives in the host application.

use serde::{Deserialize, Serialize};

/// Display name used when no session is present.
pub const DEFAULT_USER_NAME: &str = "Juan Doe";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub email: String,
    pub name: String,
    pub role: String,
}
