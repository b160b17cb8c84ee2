//! Error types for the outbox pipeline.

use std::error::Error;

use thiserror::Error;

use super::StoredEventId;
use crate::lock::LockError;

/// Error type for [`Store`](super::Store) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The cursor handed to `get_all_after` was never appended to this store.
    #[error("cursor {0} is not in the store")]
    UnknownCursor(StoredEventId),
    /// An event with this id was already appended.
    #[error("stored event {0} already exists")]
    Duplicate(StoredEventId),
    /// The in-memory log lock was poisoned.
    #[error("store poisoned: {0}")]
    Poisoned(String),
    /// Failure reported by a persistent backend.
    #[error("store backend error: {0}")]
    Backend(Box<dyn Error + Send + Sync>),
}

/// Error type for cursor reads and writes on a
/// [`DispatchTracker`](super::DispatchTracker).
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A backend that couples cursors with its lock session failed to take it.
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("tracker poisoned: {0}")]
    Poisoned(String),
    #[error("tracker backend error: {0}")]
    Backend(Box<dyn Error + Send + Sync>),
}

/// Error type for [`Transport::send`](super::Transport::send).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection to the destination failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// The destination rejected the event.
    #[error("event rejected: {0}")]
    Rejected(String),
    /// A buffer or client handle was poisoned.
    #[error("transport poisoned: {0}")]
    Poisoned(String),
    #[error("transport error: {0}")]
    Other(Box<dyn Error + Send + Sync>),
}

/// Error type for [`EventSerializer`](super::EventSerializer)s.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bitcode: {0}")]
    Bitcode(String),
    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl From<bitcode::Error> for SerializeError {
    fn from(err: bitcode::Error) -> Self {
        SerializeError::Bitcode(err.to_string())
    }
}

/// Error returned when storing a domain event in the outbox.
#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] SerializeError),
    #[error("failed to append event: {0}")]
    Store(#[from] StoreError),
}

/// Why a dispatch attempt was aborted.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to send to {transport}: {source}")]
    Transport {
        transport: String,
        #[source]
        source: TransportError,
    },
    /// The attempt failed and releasing the lock afterwards failed too.
    #[error("{unlock}: {error}")]
    Unlock {
        #[source]
        error: Box<DispatchError>,
        unlock: LockError,
    },
}

impl DispatchError {
    /// Attach a failed release to this error.
    pub fn with_unlock(self, unlock: LockError) -> Self {
        DispatchError::Unlock {
            error: Box::new(self),
            unlock,
        }
    }
}
