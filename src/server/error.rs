//! Error types for servers and the hub.

use std::error::Error;
use std::io;

use thiserror::Error;

/// Error returned by [`Server::serve`](super::Server::serve) or
/// [`Server::stop`](super::Server::stop).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    /// `serve` was called a second time on a server that can only run once.
    #[error("server already served")]
    AlreadyServed,
    #[error("server runtime error: {0}")]
    Runtime(String),
    #[error("server error: {0}")]
    Other(Box<dyn Error + Send + Sync>),
}

impl ServerError {
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        ServerError::Other(err.into())
    }
}

/// Why [`Hub::run`](super::Hub::run) returned.
#[derive(Debug, Error)]
pub enum HubError {
    /// Stopped by request with no failures. Not a real error.
    #[error("hub is stopped by signal without errors")]
    Stopped,
    /// The first server to exit failed with this error.
    #[error("server failed: {0}")]
    Server(#[source] ServerError),
    /// Stopping the servers after a stop request failed.
    #[error("failed to stop servers: {0}")]
    Stop(#[source] ServerError),
}

impl HubError {
    /// True for a deliberate, clean stop.
    pub fn is_stopped(&self) -> bool {
        matches!(self, HubError::Stopped)
    }
}
