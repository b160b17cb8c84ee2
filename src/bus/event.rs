use std::borrow::Borrow;
use std::fmt;

/// Identifier of an event's logical type (not of a single occurrence).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        EventId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EventId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        EventId(id.to_string())
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        EventId(id)
    }
}

/// An event that can travel over the [`Bus`](super::Bus).
pub trait BusEvent {
    /// The identifier the bus routes this event by.
    fn event_id(&self) -> &str;
}

/// Handle returned by [`Bus::subscribe`](super::Bus::subscribe).
///
/// Holds everything needed to remove exactly one registration later. The
/// sequence number is unique per bus instance; `bus` names the instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub(crate) bus: u64,
    pub(crate) event_id: EventId,
    pub(crate) sequence: u64,
    pub(crate) priority: i32,
}

impl Subscription {
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }
}
