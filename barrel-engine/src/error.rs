//! Engine error types

use thiserror::Error;

use crate::mirror::MirrorError;
use crate::remote::RemoteError;

/// Errors surfaced by the consumer-facing store API.
///
/// Transient remote failures never appear here: refreshes and remote writes
/// that fail are logged and the cache keeps serving its last good snapshot.
/// Only precondition violations and missing entities reach the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Rejected before any mutation (fill guard, location guard, ...).
    /// The message is suitable for inline display next to the action.
    #[error("{0}")]
    Precondition(String),

    #[error("Mirror error: {0}")]
    Mirror(#[from] MirrorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

pub type StoreResult<T> = Result<T, StoreError>;
