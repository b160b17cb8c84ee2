use super::{DispatchSignal, EventSerializer, OutboxError, Store, StoredEvent, StoredEventId};
use crate::domain::{DomainEvent, EventHandler, HandlerError};

/// Domain event handler that writes every event it sees to the outbox.
///
/// Subscribe it to an [`EventDispatcher`](crate::domain::EventDispatcher)
/// ahead of handlers whose failure should not prevent the event from being
/// stored. With a [`DispatchSignal`] attached, each successful append also
/// tells the sender that new work exists.
pub struct OutboxHandler<S, Z> {
    store: S,
    serializer: Z,
    signal: Option<DispatchSignal>,
}

impl<S: Store, Z> OutboxHandler<S, Z> {
    pub fn new(store: S, serializer: Z) -> Self {
        OutboxHandler {
            store,
            serializer,
            signal: None,
        }
    }

    /// Bump `signal` after every successful append.
    pub fn with_signal(mut self, signal: DispatchSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Serialize `event`, append it and return the new stored event's id.
    pub fn store_event<E>(&self, event: &E) -> Result<StoredEventId, OutboxError>
    where
        E: DomainEvent,
        Z: EventSerializer<E>,
    {
        let body = self.serializer.serialize(event)?;
        let stored = StoredEvent::new(event.event_type(), body);
        let id = stored.id;

        self.store.append(stored)?;

        if let Some(signal) = &self.signal {
            signal.increment();
        }
        Ok(id)
    }
}

impl<E, S, Z> EventHandler<E> for OutboxHandler<S, Z>
where
    E: DomainEvent,
    S: Store,
    Z: EventSerializer<E>,
{
    fn handle(&self, event: &E) -> Result<(), HandlerError> {
        self.store_event(event)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use crate::outbox::{InMemoryStore, JsonSerializer, SerializeError, StoreError};

    #[derive(Serialize)]
    struct PlaylistCreated {
        name: String,
    }

    impl DomainEvent for PlaylistCreated {
        fn event_type(&self) -> &str {
            "playlist.created"
        }
    }

    struct FailingSerializer;

    impl EventSerializer<PlaylistCreated> for FailingSerializer {
        fn serialize(&self, _event: &PlaylistCreated) -> Result<String, SerializeError> {
            Err(SerializeError::Bitcode("boom".into()))
        }
    }

    struct FailingStore;

    impl Store for FailingStore {
        fn append(&self, _event: StoredEvent) -> Result<(), StoreError> {
            Err(StoreError::Poisoned("down".into()))
        }

        fn get_all_after(
            &self,
            _cursor: Option<&StoredEventId>,
        ) -> Result<Vec<StoredEvent>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn created() -> PlaylistCreated {
        PlaylistCreated {
            name: "road trip".into(),
        }
    }

    #[test]
    fn handle_appends_serialized_event() {
        let store = InMemoryStore::new();
        let handler = OutboxHandler::new(store.clone(), JsonSerializer);

        handler.handle(&created()).unwrap();

        let events = store.events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "playlist.created");
        assert_eq!(events[0].body, r#"{"name":"road trip"}"#);
    }

    #[test]
    fn successful_append_bumps_the_signal() {
        let signal = DispatchSignal::new();
        let handler =
            OutboxHandler::new(InMemoryStore::new(), JsonSerializer).with_signal(signal.clone());

        handler.handle(&created()).unwrap();
        handler.handle(&created()).unwrap();

        assert_eq!(signal.pending(), 2);
    }

    #[test]
    fn serializer_errors_propagate() {
        let store = InMemoryStore::new();
        let signal = DispatchSignal::new();
        let handler =
            OutboxHandler::new(store.clone(), FailingSerializer).with_signal(signal.clone());

        let err = handler.handle(&created()).unwrap_err();

        assert!(matches!(
            err,
            HandlerError::Outbox(OutboxError::Serialize(SerializeError::Bitcode(_)))
        ));
        assert!(store.is_empty());
        assert_eq!(signal.pending(), 0);
    }

    #[test]
    fn store_errors_propagate() {
        let handler = OutboxHandler::new(FailingStore, JsonSerializer);
        let err = handler.handle(&created()).unwrap_err();
        assert!(matches!(
            err,
            HandlerError::Outbox(OutboxError::Store(StoreError::Poisoned(_)))
        ));
    }
}
