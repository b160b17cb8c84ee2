pub mod bus;
pub mod config;
pub mod domain;
pub mod lock;
pub mod outbox;
pub mod server;

pub use bus::{Bus, BusEvent, EventId, Subscription};
pub use config::{ConfigError, SenderConfig};
pub use domain::{DomainEvent, EventDispatcher, HandlerError};
pub use lock::{InMemoryLock, InMemoryLockRegistry, Lock, LockError};
pub use outbox::{
    ConnectionEvent, DispatchError, DispatchSignal, DispatchTracker, InMemoryDispatchTracker,
    InMemoryStore, LogTransport, OutboxHandler, ReconnectingTransport, Relay, Sender, SenderStats,
    Store, StoredEvent, StoredEventId, Transport,
};
pub use server::{FuncServer, Hub, HubError, HubState, Server, ServerError, StopHandle};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
