//! Priority Bus - synchronous in-process publish/subscribe.
//!
//! Listeners register for an [`EventId`] with a priority. Publishing an
//! event invokes every listener currently registered for its identifier,
//! highest priority first; listeners sharing a priority run in the order they
//! subscribed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Bus<E: BusEvent>                           │
//! │  registry: Mutex<HashMap<EventId, Vec<Registration>>>       │
//! └─────────────────────────────────────────────────────────────┘
//!        │ subscribe / unsubscribe          │ publish
//!        ▼ (short critical section)         ▼
//!   insert / remove by sequence     snapshot → unlock → sort
//!                                   (stable, priority desc) → call
//! ```
//!
//! Because `publish` works on a snapshot, handlers may freely subscribe or
//! unsubscribe (even on the same bus) while being invoked. Such changes only
//! affect later publishes.
//!
//! ## Example
//!
//! ```
//! use event_relay::bus::{Bus, BusEvent};
//!
//! struct UserCreated;
//!
//! impl BusEvent for UserCreated {
//!     fn event_id(&self) -> &str {
//!         "user.created"
//!     }
//! }
//!
//! let bus = Bus::new();
//! let subscription = bus.subscribe("user.created", 10, |_: &UserCreated| {
//!     // react to the event
//! });
//!
//! bus.publish(&UserCreated);
//! bus.unsubscribe(&subscription);
//! ```

mod bus;
mod event;

pub use bus::{Bus, EventHandler};
pub use event::{BusEvent, EventId, Subscription};
