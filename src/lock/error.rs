use std::time::Duration;

use thiserror::Error;

/// Error type for lock operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// The token stayed held by someone else for the whole wait budget.
    #[error("timeout of {timeout:?} reached for lock {name}")]
    Timeout { name: String, timeout: Duration },
    /// Release was attempted on a token that was never created.
    #[error("lock {0} not found")]
    NotFound(String),
    /// Release was attempted on a token this holder does not own.
    #[error("lock {0} not acquired")]
    NotAcquired(String),
    /// The underlying primitive was poisoned (a thread panicked while holding it).
    #[error("lock poisoned: {0}")]
    Poisoned(String),
    /// Any other lock error, e.g. from a remote backend.
    #[error("lock error: {0}")]
    Other(String),
}

impl LockError {
    /// Contention rather than misuse; worth retrying later.
    pub fn is_timeout(&self) -> bool {
        matches!(self, LockError::Timeout { .. })
    }
}
