//! Background thread that drives a [`Relay`] on a timer.

use std::sync::mpsc::{channel, RecvTimeoutError, Sender as StopSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{
    DispatchError, DispatchSignal, DispatchTracker, Relay, Store, TickOutcome, Transport,
};
use crate::config::SenderConfig;

/// Statistics from the sender thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SenderStats {
    /// Timer expirations, including idle ones.
    pub ticks: usize,
    /// Ticks that took the lock (or tried to).
    pub attempts: usize,
    pub events_sent: usize,
    /// Attempts handed to the error callback.
    pub failures: usize,
}

/// Default error callback: logs the failure and carries on.
pub fn log_dispatch_error(err: DispatchError) {
    tracing::error!(error = %err, "failed to dispatch stored events");
}

/// A background thread that periodically drains the outbox into one transport.
///
/// Dispatch attempts never overlap: a single thread runs them one after the
/// other. Failed attempts go to the error callback and are retried on a later
/// tick; the sender only exits when stopped.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use event_relay::lock::InMemoryLockRegistry;
/// use event_relay::outbox::{
///     log_dispatch_error, InMemoryDispatchTracker, InMemoryStore, LogTransport, Relay, Sender,
/// };
///
/// let store = InMemoryStore::new();
/// let locks = InMemoryLockRegistry::new();
/// let tracker = InMemoryDispatchTracker::new(locks.lock("audit", Duration::from_secs(5)));
/// let relay = Relay::new(store.clone(), tracker, LogTransport::new("audit"));
///
/// let sender = Sender::spawn(relay, Duration::from_millis(50), log_dispatch_error);
///
/// // ... append to `store`, then:
/// sender.increment();
///
/// let stats = sender.stop();
/// assert_eq!(stats.failures, 0);
/// ```
pub struct Sender {
    signal: DispatchSignal,
    transport: String,
    stop_tx: StopSender<()>,
    handle: Option<JoinHandle<SenderStats>>,
}

impl Sender {
    /// Spawn the sender thread, ticking every `poll_interval`.
    pub fn spawn<S, D, T, F>(relay: Relay<S, D, T>, poll_interval: Duration, on_error: F) -> Self
    where
        S: Store + 'static,
        D: DispatchTracker + 'static,
        T: Transport + 'static,
        F: Fn(DispatchError) + Send + 'static,
    {
        let (stop_tx, stop_rx) = channel::<()>();
        let signal = relay.signal();
        let transport = relay.transport_name().to_string();

        let span = tracing::info_span!("stored_event_sender", transport = %transport);

        let handle = thread::spawn(move || {
            let _entered = span.enter();
            let mut stats = SenderStats::default();
            tracing::info!(?poll_interval, "sender started");

            loop {
                match stop_rx.recv_timeout(poll_interval) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                stats.ticks += 1;

                match relay.tick() {
                    Ok(TickOutcome::Idle) => {}
                    Ok(TickOutcome::Empty) => {
                        stats.attempts += 1;
                        tracing::debug!("nothing readable past the cursor yet");
                    }
                    Ok(outcome @ TickOutcome::Dispatched { events, .. }) => {
                        stats.attempts += 1;
                        stats.events_sent += events;
                        tracing::debug!(?outcome, "dispatched stored events");
                    }
                    Err(err) => {
                        stats.attempts += 1;
                        stats.failures += 1;
                        on_error(err);
                    }
                }
            }

            tracing::info!(?stats, "sender stopped");
            stats
        });

        Self {
            signal,
            transport,
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Spawn with the poll interval from `config`.
    pub fn from_config<S, D, T, F>(
        relay: Relay<S, D, T>,
        config: &SenderConfig,
        on_error: F,
    ) -> Self
    where
        S: Store + 'static,
        D: DispatchTracker + 'static,
        T: Transport + 'static,
        F: Fn(DispatchError) + Send + 'static,
    {
        Self::spawn(relay, config.poll_interval, on_error)
    }

    /// Record that new work may exist. Cheap; safe from any thread.
    pub fn increment(&self) {
        self.signal.increment();
    }

    /// A handle producers can keep to call `increment` without the sender.
    pub fn signal(&self) -> DispatchSignal {
        self.signal.clone()
    }

    pub fn pending(&self) -> u32 {
        self.signal.pending()
    }

    pub fn transport_name(&self) -> &str {
        &self.transport
    }

    /// Signal the sender to stop and wait for it to finish.
    /// An in-flight attempt completes first. Returns the sender statistics.
    pub fn stop(mut self) -> SenderStats {
        let _ = self.stop_tx.send(());
        let Some(handle) = self.handle.take() else {
            return SenderStats::default();
        };
        handle.join().unwrap_or_else(|_| {
            tracing::error!(transport = %self.transport, "sender thread panicked");
            SenderStats::default()
        })
    }

    /// Signal the sender to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for Sender {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        // Don't join on drop - let the thread finish naturally
    }
}
