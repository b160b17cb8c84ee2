//! Outbox end-to-end: domain events through the dispatcher into the store,
//! and from the store to transports via relays and senders.

mod delivery;
mod multi_instance;
mod support;
