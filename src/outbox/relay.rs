//! One destination's dispatch attempt, run once per sender tick.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::{DispatchError, DispatchTracker, Store, Transport};

/// Clonable handle onto a relay's pending-dispatch counter.
///
/// Producers call [`increment`](Self::increment) after appending to the
/// store. Any number of signals between two ticks collapse into one attempt.
#[derive(Clone, Debug, Default)]
pub struct DispatchSignal {
    pending: Arc<AtomicU32>,
}

impl DispatchSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that new work may exist.
    pub fn increment(&self) {
        let mut current = self.pending.load(Ordering::SeqCst);
        loop {
            match self.pending.compare_exchange_weak(
                current,
                current.saturating_add(1),
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::SeqCst)
    }

    // Zero the counter only if nothing arrived since `observed` was read.
    fn reset(&self, observed: u32) -> bool {
        self.pending
            .compare_exchange(observed, 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// What a single [`Relay::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No pending signal; nothing was touched.
    Idle,
    /// Locked and looked, but nothing past the cursor was readable yet. The
    /// counter is kept so the next tick looks again.
    Empty,
    /// Sent `events` events and advanced the cursor.
    Dispatched { events: usize, counter_reset: bool },
}

impl TickOutcome {
    /// Whether the tick took the lock and talked to the store.
    pub fn attempted(&self) -> bool {
        !matches!(self, TickOutcome::Idle)
    }
}

/// Drains a [`Store`] into one [`Transport`] under a [`DispatchTracker`]'s lock.
///
/// The [`Sender`](super::Sender) calls [`tick`](Self::tick) on a timer from a
/// single thread; calling it directly is useful in tests and one-shot tools.
pub struct Relay<S, D, T> {
    store: S,
    tracker: D,
    transport: T,
    signal: DispatchSignal,
}

impl<S, D, T> Relay<S, D, T>
where
    S: Store,
    D: DispatchTracker,
    T: Transport,
{
    pub fn new(store: S, tracker: D, transport: T) -> Self {
        Relay {
            store,
            tracker,
            transport,
            signal: DispatchSignal::new(),
        }
    }

    /// Share an existing counter, e.g. one already handed to producers.
    pub fn with_signal(mut self, signal: DispatchSignal) -> Self {
        self.signal = signal;
        self
    }

    pub fn signal(&self) -> DispatchSignal {
        self.signal.clone()
    }

    pub fn increment(&self) {
        self.signal.increment();
    }

    pub fn pending(&self) -> u32 {
        self.signal.pending()
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Run one dispatch attempt if any signal is pending.
    ///
    /// On error the counter is left as is, so the next tick retries from the
    /// same cursor.
    pub fn tick(&self) -> Result<TickOutcome, DispatchError> {
        let requests = self.signal.pending();
        if requests == 0 {
            return Ok(TickOutcome::Idle);
        }

        self.tracker.lock()?;
        let result = self.drain(requests);

        match (result, self.tracker.unlock()) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(unlock)) => Err(DispatchError::Lock(unlock)),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(unlock)) => Err(err.with_unlock(unlock)),
        }
    }

    // Caller holds the lock.
    fn drain(&self, requests: u32) -> Result<TickOutcome, DispatchError> {
        let name = self.transport.name();
        let cursor = self.tracker.last_id(name)?;
        let events = self.store.get_all_after(cursor.as_ref())?;

        let Some(last) = events.last() else {
            return Ok(TickOutcome::Empty);
        };

        for event in &events {
            self.transport
                .send(&event.event_type, &event.body)
                .map_err(|source| DispatchError::Transport {
                    transport: name.to_string(),
                    source,
                })?;
        }

        self.tracker.track_last_id(name, &last.id)?;

        Ok(TickOutcome::Dispatched {
            events: events.len(),
            counter_reset: self.signal.reset(requests),
        })
    }
}
