use std::sync::{Arc, Mutex};
use std::time::Duration;

use event_relay::lock::InMemoryLockRegistry;
use event_relay::outbox::{
    log_dispatch_error, InMemoryDispatchTracker, InMemoryStore, JsonSerializer, LogTransport,
    OutboxHandler, Relay, Sender,
};
use event_relay::SenderConfig;

use crate::support::{placed, wait_until};

// Two service instances share the store and cursor table; each has its own
// lock handle, so only one drains the destination at a time.
#[test]
fn two_senders_deliver_each_event_once() {
    let config = SenderConfig::new()
        .with_poll_interval(Duration::from_millis(5))
        .with_lock_timeout(Duration::from_millis(50));
    let store = InMemoryStore::new();
    let registry = InMemoryLockRegistry::new();
    let delivered = Arc::new(Mutex::new(Vec::new()));

    let first_tracker =
        InMemoryDispatchTracker::new(registry.lock(config.lock_name.clone(), config.lock_timeout));
    let second_tracker =
        first_tracker.with_lock(registry.lock(config.lock_name.clone(), config.lock_timeout));

    let first = Sender::from_config(
        Relay::new(
            store.clone(),
            first_tracker,
            LogTransport::with_buffer("webhook", Arc::clone(&delivered)),
        ),
        &config,
        log_dispatch_error,
    );
    let second = Sender::from_config(
        Relay::new(
            store.clone(),
            second_tracker,
            LogTransport::with_buffer("webhook", Arc::clone(&delivered)),
        ),
        &config,
        log_dispatch_error,
    );

    let handler = OutboxHandler::new(store.clone(), JsonSerializer);
    for n in 0..20 {
        handler.store_event(&placed(&format!("o-{n}"), n)).unwrap();
        first.increment();
        second.increment();
    }

    assert!(wait_until(|| delivered.lock().unwrap().len() >= 20));
    // The instance that lost the race keeps looking; nothing more arrives.
    std::thread::sleep(Duration::from_millis(30));
    first.stop();
    second.stop();

    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 20);
    for (n, line) in delivered.iter().enumerate() {
        assert!(
            line.contains(&format!("\"o-{n}\"")),
            "event {n} out of order: {line}"
        );
    }
    assert!(!registry.is_held(&config.lock_name).unwrap());
}

#[test]
fn destinations_keep_independent_cursors() {
    let store = InMemoryStore::new();
    let registry = InMemoryLockRegistry::new();
    let tracker = InMemoryDispatchTracker::new(registry.lock("sender", Duration::from_millis(50)));
    let amqp_log = Arc::new(Mutex::new(Vec::new()));
    let webhook_log = Arc::new(Mutex::new(Vec::new()));

    let handler = OutboxHandler::new(store.clone(), JsonSerializer);
    handler.store_event(&placed("o-1", 1)).unwrap();

    let amqp = Relay::new(
        store.clone(),
        tracker.with_lock(registry.lock("sender", Duration::from_millis(50))),
        LogTransport::with_buffer("amqp", Arc::clone(&amqp_log)),
    );
    let webhook = Relay::new(
        store.clone(),
        tracker,
        LogTransport::with_buffer("webhook", Arc::clone(&webhook_log)),
    );

    amqp.increment();
    amqp.tick().unwrap();

    handler.store_event(&placed("o-2", 2)).unwrap();
    amqp.increment();
    webhook.increment();
    amqp.tick().unwrap();
    webhook.tick().unwrap();

    assert_eq!(amqp_log.lock().unwrap().len(), 2);
    assert_eq!(webhook_log.lock().unwrap().len(), 2);
    assert!(webhook_log.lock().unwrap()[0].starts_with("[webhook] order.placed"));
}
