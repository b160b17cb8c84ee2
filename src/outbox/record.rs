use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a stored event.
///
/// Random (v4), so the value says nothing about append order. Stores keep
/// their own sequence for "after" queries.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct StoredEventId(Uuid);

impl StoredEventId {
    pub fn new() -> Self {
        StoredEventId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StoredEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for StoredEventId {
    fn from(id: Uuid) -> Self {
        StoredEventId(id)
    }
}

impl FromStr for StoredEventId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(StoredEventId)
    }
}

impl fmt::Display for StoredEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A serialized domain event sitting in the outbox.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct StoredEvent {
    pub id: StoredEventId,
    pub event_type: String,
    pub body: String,
}

impl StoredEvent {
    /// Build a stored event with a freshly generated id.
    pub fn new(event_type: impl Into<String>, body: impl Into<String>) -> Self {
        StoredEvent {
            id: StoredEventId::new(),
            event_type: event_type.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = StoredEvent::new("Created", "{}");
        let b = StoredEvent::new("Created", "{}");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn id_parses_its_display_form() {
        let id = StoredEventId::new();
        let parsed: StoredEventId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<StoredEventId>().is_err());
    }
}
