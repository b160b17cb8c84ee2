//! Priority Bus - registry and publish path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::event::{BusEvent, EventId, Subscription};

/// Handler invoked synchronously by [`Bus::publish`].
///
/// Handlers return nothing: delivery failures are the handler's own business.
pub type EventHandler<E> = Arc<dyn Fn(&E) + Send + Sync>;

static NEXT_BUS_ID: AtomicU64 = AtomicU64::new(1);

struct Registration<E> {
    sequence: u64,
    priority: i32,
    handler: EventHandler<E>,
}

impl<E> Clone for Registration<E> {
    fn clone(&self) -> Self {
        Registration {
            sequence: self.sequence,
            priority: self.priority,
            handler: Arc::clone(&self.handler),
        }
    }
}

struct Registry<E> {
    next_sequence: u64,
    subscribers: HashMap<EventId, Vec<Registration<E>>>,
}

/// In-process publish/subscribe register keyed by [`EventId`].
///
/// `Bus` is `Send + Sync` when `E` is, so a single instance is typically
/// shared behind an `Arc`.
pub struct Bus<E> {
    id: u64,
    registry: Mutex<Registry<E>>,
}

impl<E> Default for Bus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Bus<E> {
    pub fn new() -> Self {
        Bus {
            id: NEXT_BUS_ID.fetch_add(1, Ordering::Relaxed),
            registry: Mutex::new(Registry {
                next_sequence: 0,
                subscribers: HashMap::new(),
            }),
        }
    }

    // A handler that panicked mid-publish never held this mutex, so a
    // poisoned registry is still consistent.
    fn registry(&self) -> MutexGuard<'_, Registry<E>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `handler` for `event_id`. Never fails.
    pub fn subscribe<F>(
        &self,
        event_id: impl Into<EventId>,
        priority: i32,
        handler: F,
    ) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let event_id = event_id.into();
        let mut registry = self.registry();

        let sequence = registry.next_sequence;
        registry.next_sequence += 1;

        registry
            .subscribers
            .entry(event_id.clone())
            .or_default()
            .push(Registration {
                sequence,
                priority,
                handler: Arc::new(handler),
            });

        Subscription {
            bus: self.id,
            event_id,
            sequence,
            priority,
        }
    }

    /// Remove the registration behind `subscription`.
    ///
    /// Unknown or already removed subscriptions, including ones issued by
    /// another bus, are ignored. The identifier's entry is dropped once its
    /// last registration goes.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        if subscription.bus != self.id {
            return;
        }
        let mut registry = self.registry();

        let Some(registrations) = registry.subscribers.get_mut(subscription.event_id.as_str())
        else {
            return;
        };

        if let Some(index) = registrations
            .iter()
            .position(|r| r.sequence == subscription.sequence)
        {
            registrations.remove(index);
        }

        if registrations.is_empty() {
            registry.subscribers.remove(subscription.event_id.as_str());
        }
    }

    /// Number of live registrations for `event_id`.
    pub fn subscribers(&self, event_id: &str) -> usize {
        self.registry()
            .subscribers
            .get(event_id)
            .map_or(0, Vec::len)
    }

    /// True when no identifier has any registration left.
    pub fn is_empty(&self) -> bool {
        self.registry().subscribers.is_empty()
    }

    fn snapshot(&self, event_id: &str) -> Vec<Registration<E>> {
        self.registry()
            .subscribers
            .get(event_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl<E: BusEvent> Bus<E> {
    /// Deliver `event` to every handler registered for its identifier.
    ///
    /// Handlers run on the caller's thread, highest priority first, ties in
    /// subscription order. The registry lock is released before the first
    /// handler runs.
    pub fn publish(&self, event: &E) {
        let mut registrations = self.snapshot(event.event_id());

        // `sort_by` is stable, which keeps subscription order among equals.
        registrations.sort_by(|a, b| b.priority.cmp(&a.priority));

        for registration in registrations {
            (registration.handler)(event);
        }
    }
}
