use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{Store, StoreError, StoredEvent, StoredEventId};

#[derive(Default)]
struct Log {
    events: Vec<StoredEvent>,
    // id -> position in `events`
    positions: HashMap<StoredEventId, usize>,
}

/// In-memory outbox store.
///
/// Cloning creates another handle to the same log, so one clone can feed an
/// [`OutboxHandler`](super::OutboxHandler) while another backs a
/// [`Relay`](super::Relay).
#[derive(Clone, Default)]
pub struct InMemoryStore {
    log: Arc<RwLock<Log>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored events in append order.
    pub fn events(&self) -> Result<Vec<StoredEvent>, StoreError> {
        self.get_all_after(None)
    }

    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for InMemoryStore {
    fn append(&self, event: StoredEvent) -> Result<(), StoreError> {
        let mut log = self
            .log
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;

        if log.positions.contains_key(&event.id) {
            return Err(StoreError::Duplicate(event.id));
        }

        let position = log.events.len();
        log.positions.insert(event.id, position);
        log.events.push(event);
        Ok(())
    }

    fn get_all_after(
        &self,
        cursor: Option<&StoredEventId>,
    ) -> Result<Vec<StoredEvent>, StoreError> {
        let log = self
            .log
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;

        let start = match cursor {
            None => 0,
            Some(id) => match log.positions.get(id) {
                Some(position) => position + 1,
                None => return Err(StoreError::UnknownCursor(*id)),
            },
        };

        Ok(log.events[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn event_with_id(id: u128, event_type: &str) -> StoredEvent {
        StoredEvent {
            id: Uuid::from_u128(id).into(),
            event_type: event_type.to_string(),
            body: "{}".to_string(),
        }
    }

    #[test]
    fn empty_store_returns_nothing() {
        let store = InMemoryStore::new();
        assert!(store.get_all_after(None).unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn cursor_follows_append_order_not_id_order() {
        let store = InMemoryStore::new();
        // Ids deliberately descending.
        store.append(event_with_id(30, "first")).unwrap();
        store.append(event_with_id(20, "second")).unwrap();
        store.append(event_with_id(10, "third")).unwrap();

        let after_first = store
            .get_all_after(Some(&Uuid::from_u128(30).into()))
            .unwrap();
        let types: Vec<_> = after_first.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, vec!["second", "third"]);

        let after_last = store
            .get_all_after(Some(&Uuid::from_u128(10).into()))
            .unwrap();
        assert!(after_last.is_empty());
    }

    #[test]
    fn unknown_cursor_is_an_error() {
        let store = InMemoryStore::new();
        store.append(StoredEvent::new("Created", "{}")).unwrap();

        let err = store
            .get_all_after(Some(&StoredEventId::new()))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownCursor(_)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let store = InMemoryStore::new();
        let event = StoredEvent::new("Created", "{}");
        store.append(event.clone()).unwrap();

        assert!(matches!(
            store.append(event),
            Err(StoreError::Duplicate(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clones_share_the_log() {
        let store = InMemoryStore::new();
        let other = store.clone();
        other.append(StoredEvent::new("Created", "{}")).unwrap();
        assert_eq!(store.len(), 1);
    }
}
