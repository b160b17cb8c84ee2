//! Domain events and their synchronous dispatcher.
//!
//! An [`EventDispatcher`] holds an ordered list of [`EventHandler`]s wired
//! once at startup. [`EventDispatcher::dispatch`] runs them in order and stops
//! at the first error. There is no rollback: side effects of handlers that
//! already ran (an outbox append, say) stay in place.
//!
//! ## Example
//!
//! ```
//! use event_relay::domain::{DomainEvent, EventDispatcher, HandlerError};
//!
//! struct OrderPlaced {
//!     order_id: String,
//! }
//!
//! impl DomainEvent for OrderPlaced {
//!     fn event_type(&self) -> &str {
//!         "order.placed"
//!     }
//! }
//!
//! let mut dispatcher = EventDispatcher::new();
//! dispatcher.subscribe(|event: &OrderPlaced| {
//!     if event.order_id.is_empty() {
//!         return Err(HandlerError::Rejected("missing order id".into()));
//!     }
//!     Ok(())
//! });
//!
//! dispatcher
//!     .dispatch(&OrderPlaced { order_id: "o-1".into() })
//!     .unwrap();
//! ```

mod dispatcher;
mod error;

pub use dispatcher::{DomainEvent, EventDispatcher, EventHandler};
pub use error::HandlerError;
