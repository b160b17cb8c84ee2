use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use event_relay::outbox::{Transport, TransportError};
use event_relay::DomainEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OrderEvent {
    Placed { order_id: String, total_cents: u64 },
    Cancelled { order_id: String },
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &str {
        match self {
            OrderEvent::Placed { .. } => "order.placed",
            OrderEvent::Cancelled { .. } => "order.cancelled",
        }
    }
}

pub fn placed(order_id: &str, total_cents: u64) -> OrderEvent {
    OrderEvent::Placed {
        order_id: order_id.to_string(),
        total_cents,
    }
}

pub fn cancelled(order_id: &str) -> OrderEvent {
    OrderEvent::Cancelled {
        order_id: order_id.to_string(),
    }
}

pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Records delivered `(event_type, body)` pairs and refuses the sends whose
/// (1-based) attempt number is listed.
pub struct FlakyTransport {
    attempts: AtomicUsize,
    fail_on: Vec<usize>,
    pub delivered: Mutex<Vec<(String, String)>>,
}

impl FlakyTransport {
    pub fn new(fail_on: &[usize]) -> Self {
        FlakyTransport {
            attempts: AtomicUsize::new(0),
            fail_on: fail_on.to_vec(),
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn types(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(event_type, _)| event_type.clone())
            .collect()
    }
}

impl Transport for FlakyTransport {
    fn name(&self) -> &str {
        "amqp"
    }

    fn send(&self, event_type: &str, body: &str) -> Result<(), TransportError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on.contains(&attempt) {
            return Err(TransportError::ConnectionFailed("broker unavailable".into()));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((event_type.to_string(), body.to_string()));
        Ok(())
    }
}
