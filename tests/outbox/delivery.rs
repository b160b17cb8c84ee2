use std::sync::{Arc, Mutex};
use std::time::Duration;

use event_relay::lock::{InMemoryLock, InMemoryLockRegistry};
use event_relay::outbox::{
    BitcodeSerializer, DispatchError, DispatchSignal, InMemoryDispatchTracker, InMemoryStore,
    JsonSerializer, OutboxHandler, Relay, Sender, TickOutcome,
};
use event_relay::{EventDispatcher, HandlerError};

use crate::support::{cancelled, placed, wait_until, FlakyTransport, OrderEvent};

fn tracker(registry: &InMemoryLockRegistry) -> InMemoryDispatchTracker<InMemoryLock> {
    let lock = registry.lock("stored_event_sender", Duration::from_millis(200));
    InMemoryDispatchTracker::new(lock)
}

#[test]
fn dispatched_events_reach_the_transport_in_order() {
    let store = InMemoryStore::new();
    let signal = DispatchSignal::new();
    let registry = InMemoryLockRegistry::new();
    let transport = Arc::new(FlakyTransport::new(&[]));

    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe(
        OutboxHandler::new(store.clone(), JsonSerializer).with_signal(signal.clone()),
    );

    let relay = Relay::new(store.clone(), tracker(&registry), Arc::clone(&transport))
        .with_signal(signal);

    dispatcher.dispatch(&placed("o-1", 1250)).unwrap();
    dispatcher.dispatch(&cancelled("o-1")).unwrap();
    assert_eq!(relay.pending(), 2);

    assert_eq!(
        relay.tick().unwrap(),
        TickOutcome::Dispatched {
            events: 2,
            counter_reset: true
        }
    );

    let delivered = transport.delivered.lock().unwrap().clone();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].0, "order.placed");
    assert_eq!(
        JsonSerializer::decode::<OrderEvent>(&delivered[0].1).unwrap(),
        placed("o-1", 1250)
    );
    assert_eq!(
        JsonSerializer::decode::<OrderEvent>(&delivered[1].1).unwrap(),
        cancelled("o-1")
    );
}

#[test]
fn bitcode_bodies_survive_the_trip() {
    let store = InMemoryStore::new();
    let registry = InMemoryLockRegistry::new();
    let transport = Arc::new(FlakyTransport::new(&[]));

    let handler = OutboxHandler::new(store.clone(), BitcodeSerializer);
    handler.store_event(&placed("o-7", 99)).unwrap();

    let relay = Relay::new(store, tracker(&registry), Arc::clone(&transport));
    relay.increment();
    relay.tick().unwrap();

    let delivered = transport.delivered.lock().unwrap().clone();
    assert_eq!(
        BitcodeSerializer::decode::<OrderEvent>(&delivered[0].1).unwrap(),
        placed("o-7", 99)
    );
}

#[test]
fn event_is_stored_even_when_a_later_handler_fails() {
    let store = InMemoryStore::new();
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe(OutboxHandler::new(store.clone(), JsonSerializer));
    dispatcher.subscribe(|_: &OrderEvent| -> Result<(), HandlerError> {
        Err(HandlerError::Rejected("inventory".into()))
    });

    let err = dispatcher.dispatch(&placed("o-2", 10)).unwrap_err();

    assert!(matches!(err, HandlerError::Rejected(ref reason) if reason == "inventory"));
    assert_eq!(store.len(), 1);
}

#[test]
fn sender_retries_the_whole_batch_after_a_failed_send() {
    let store = InMemoryStore::new();
    let registry = InMemoryLockRegistry::new();
    let transport = Arc::new(FlakyTransport::new(&[2]));

    let handler = OutboxHandler::new(store.clone(), JsonSerializer);
    handler.store_event(&placed("o-1", 100)).unwrap();
    handler.store_event(&placed("o-2", 200)).unwrap();
    handler.store_event(&cancelled("o-1")).unwrap();

    let relay = Relay::new(store, tracker(&registry), Arc::clone(&transport));
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sender = {
        let errors = Arc::clone(&errors);
        Sender::spawn(relay, Duration::from_millis(5), move |err: DispatchError| {
            errors.lock().unwrap().push(err.to_string());
        })
    };
    sender.increment();

    assert!(wait_until(|| transport.delivered.lock().unwrap().len() == 4));
    assert!(wait_until(|| sender.pending() == 0));
    let stats = sender.stop();

    // o-1 placed is delivered again on the retry.
    assert_eq!(
        transport.types(),
        vec!["order.placed", "order.placed", "order.placed", "order.cancelled"]
    );
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.events_sent, 3);
    assert!(errors.lock().unwrap()[0].contains("amqp"));
}
