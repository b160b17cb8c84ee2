//! Error types for domain event handlers.

use std::error::Error;

use thiserror::Error;

use crate::outbox::OutboxError;

/// Error returned by an [`EventHandler`](super::EventHandler).
///
/// [`EventDispatcher::dispatch`](super::EventDispatcher::dispatch) returns the
/// first one it sees unchanged.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Persisting the event to the outbox failed.
    #[error(transparent)]
    Outbox(#[from] OutboxError),
    /// Business logic rejected the event.
    #[error("rejected: {0}")]
    Rejected(String),
    /// Any other handler failure.
    #[error("handler error: {0}")]
    Other(Box<dyn Error + Send + Sync>),
}

impl HandlerError {
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        HandlerError::Other(err.into())
    }
}
