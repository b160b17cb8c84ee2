//! Outbox - durable, at-least-once delivery of domain events to external transports.
//!
//! ## Flow
//!
//! ```text
//!  EventDispatcher ──► OutboxHandler ──serialize──► Store::append
//!                            │
//!                            └──► DispatchSignal::increment
//!
//!  Sender thread, every poll interval:
//!    pending == 0 ─► idle
//!    else ─► tracker.lock()
//!            cursor = tracker.last_id(transport)
//!            events = store.get_all_after(cursor)
//!            events empty ─► unlock, counter kept, look again next tick
//!            for event in events: transport.send(..)
//!            tracker.track_last_id(transport, last)
//!            counter: compare-and-exchange(snapshot, 0)
//!            tracker.unlock()
//! ```
//!
//! The lock makes one instance at a time drain a destination, even when
//! several instances share the store. A failed send leaves the cursor where it
//! was, so the whole batch is retried on the next tick; transports therefore
//! see duplicates and must tolerate them.
//!
//! `Store`, `DispatchTracker` and `Transport` are the seams for real
//! infrastructure. The in-memory implementations here are complete and
//! thread-safe, suitable for tests and single-process services.

mod error;
mod handler;
mod in_memory;
mod reconnect;
mod record;
mod relay;
mod sender;
mod serializer;
mod store;
mod tracker;
mod transport;

pub use error::{
    DispatchError, OutboxError, SerializeError, StoreError, TrackerError, TransportError,
};
pub use handler::OutboxHandler;
pub use in_memory::InMemoryStore;
pub use reconnect::{ConnectionEvent, ReconnectingTransport};
pub use record::{StoredEvent, StoredEventId};
pub use relay::{DispatchSignal, Relay, TickOutcome};
pub use sender::{log_dispatch_error, Sender, SenderStats};
pub use serializer::{BitcodeSerializer, EventSerializer, JsonSerializer};
pub use store::Store;
pub use tracker::{DispatchTracker, InMemoryDispatchTracker};
#[cfg(feature = "emitter")]
pub use transport::EmitterTransport;
pub use transport::{LogTransport, Transport};
