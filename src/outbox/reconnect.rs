//! Transport wrapper that (re)establishes its connection with exponential backoff.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;

use super::{Transport, TransportError};

/// Connection lifecycle reported by a [`ReconnectingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// First successful connect, after `attempts` tries.
    Connected { attempts: usize },
    /// A connect attempt failed; the next one runs after `retry_in`.
    RetryFailed { error: String, retry_in: Duration },
    /// The live connection failed a send and was dropped.
    Lost { error: String },
    /// A connection was re-established after being lost.
    Restored { attempts: usize },
    /// Backoff ran out of time without a connection.
    GaveUp { error: String },
}

type Listener = Box<dyn Fn(&ConnectionEvent) + Send + Sync>;

struct Link<T> {
    conn: Option<T>,
    lost: bool,
}

/// Wraps a connection-oriented [`Transport`] built by a `connect` closure.
///
/// The connection is opened lazily on the first send, retried with
/// exponential backoff (500ms initial interval, 5s cap, 60s budget by
/// default). A send failing with [`TransportError::ConnectionFailed`] drops
/// the connection; the relay retries the batch on a later tick, and that
/// send reconnects. Every lifecycle change is logged through `tracing` and
/// handed to the optional listener.
pub struct ReconnectingTransport<T, C> {
    name: String,
    connect: C,
    link: Mutex<Link<T>>,
    initial_interval: Duration,
    max_interval: Duration,
    max_elapsed: Duration,
    listener: Option<Listener>,
}

impl<T, C> ReconnectingTransport<T, C>
where
    T: Transport,
    C: Fn() -> Result<T, TransportError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, connect: C) -> Self {
        ReconnectingTransport {
            name: name.into(),
            connect,
            link: Mutex::new(Link {
                conn: None,
                lost: false,
            }),
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            max_elapsed: Duration::from_secs(60),
            listener: None,
        }
    }

    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    /// Total time one reconnect may spend retrying before the send fails.
    pub fn with_max_elapsed(mut self, budget: Duration) -> Self {
        self.max_elapsed = budget;
        self
    }

    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&ConnectionEvent) + Send + Sync + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Whether a live connection is currently held.
    pub fn is_connected(&self) -> Result<bool, TransportError> {
        Ok(self.link()?.conn.is_some())
    }

    fn link(&self) -> Result<MutexGuard<'_, Link<T>>, TransportError> {
        self.link
            .lock()
            .map_err(|e| TransportError::Poisoned(e.to_string()))
    }

    fn report(&self, event: ConnectionEvent) {
        match &event {
            ConnectionEvent::Connected { attempts } => {
                tracing::info!(transport = %self.name, attempts, "connection established")
            }
            ConnectionEvent::Restored { attempts } => {
                tracing::info!(transport = %self.name, attempts, "connection restored")
            }
            ConnectionEvent::RetryFailed { error, retry_in } => {
                tracing::warn!(
                    transport = %self.name,
                    %error,
                    ?retry_in,
                    "failed to connect, retrying"
                )
            }
            ConnectionEvent::Lost { error } => {
                tracing::error!(transport = %self.name, %error, "connection lost, will reconnect")
            }
            ConnectionEvent::GaveUp { error } => {
                tracing::error!(transport = %self.name, %error, "giving up on connection")
            }
        }
        if let Some(listener) = &self.listener {
            listener(&event);
        }
    }

    fn establish(&self, link: &mut Link<T>) -> Result<(), TransportError> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(Some(self.max_elapsed))
            .build();

        let mut attempts = 0;
        let connected = backoff::retry_notify(
            policy,
            || {
                attempts += 1;
                (self.connect)().map_err(backoff::Error::transient)
            },
            |err: TransportError, retry_in: Duration| {
                self.report(ConnectionEvent::RetryFailed {
                    error: err.to_string(),
                    retry_in,
                })
            },
        );

        match connected {
            Ok(conn) => {
                link.conn = Some(conn);
                if link.lost {
                    link.lost = false;
                    self.report(ConnectionEvent::Restored { attempts });
                } else {
                    self.report(ConnectionEvent::Connected { attempts });
                }
                Ok(())
            }
            Err(backoff::Error::Permanent(err)) | Err(backoff::Error::Transient { err, .. }) => {
                self.report(ConnectionEvent::GaveUp {
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }
}

impl<T, C> Transport for ReconnectingTransport<T, C>
where
    T: Transport,
    C: Fn() -> Result<T, TransportError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, event_type: &str, body: &str) -> Result<(), TransportError> {
        let mut link = self.link()?;
        if link.conn.is_none() {
            self.establish(&mut link)?;
        }
        let Some(conn) = link.conn.as_ref() else {
            return Err(TransportError::ConnectionFailed(self.name.clone()));
        };

        match conn.send(event_type, body) {
            Err(TransportError::ConnectionFailed(error)) => {
                link.conn = None;
                link.lost = true;
                self.report(ConnectionEvent::Lost {
                    error: error.clone(),
                });
                Err(TransportError::ConnectionFailed(error))
            }
            other => other,
        }
    }
}
