//! Data models
//!
//! Shared between the engine and the desktop/web frontends (via API).
//! All IDs are opaque `String`s; timestamps are RFC 3339 strings.

pub mod activity;
pub mod barrel;
pub mod batch;
pub mod comment;
pub mod event;
pub mod location;
pub mod notification;
pub mod recipe;
pub mod session;

// Re-exports
pub use activity::*;
pub use barrel::*;
pub use batch::*;
pub use comment::*;
pub use event::*;
pub use location::*;
pub use notification::*;
pub use recipe::*;
pub use session::*;
