//! Named, timeout-bounded mutual exclusion.
//!
//! The outbox [`Sender`](crate::outbox::Sender) takes a [`Lock`] around every
//! dispatch attempt so that only one process instance drains a destination at
//! a time. Distributed implementations might use database advisory locks,
//! Redis, etcd leases, etc. [`InMemoryLockRegistry`] is the in-process
//! reference implementation: every handle it gives out behaves like a
//! separate instance contending for the same named token.

mod error;
mod in_memory;
mod lock;

pub use error::LockError;
pub use in_memory::{InMemoryLock, InMemoryLockRegistry};
pub use lock::Lock;
