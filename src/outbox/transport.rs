use std::sync::{Arc, Mutex};

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;

use super::TransportError;

/// One logical destination for stored events (a queue, a topic, a webhook).
///
/// `name` keys the dispatch cursor, so it must stay stable across restarts.
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver one event. Duplicates are possible; receivers must tolerate them.
    fn send(&self, event_type: &str, body: &str) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&self, event_type: &str, body: &str) -> Result<(), TransportError> {
        (**self).send(event_type, body)
    }
}

/// A simple transport that logs events through `tracing` or records them in a buffer.
pub struct LogTransport {
    name: String,
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl Default for LogTransport {
    fn default() -> Self {
        Self::new("log")
    }
}

impl LogTransport {
    pub fn new(name: impl Into<String>) -> Self {
        LogTransport {
            name: name.into(),
            buffer: None,
        }
    }

    pub fn with_buffer(name: impl Into<String>, buffer: Arc<Mutex<Vec<String>>>) -> Self {
        LogTransport {
            name: name.into(),
            buffer: Some(buffer),
        }
    }
}

impl Transport for LogTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, event_type: &str, body: &str) -> Result<(), TransportError> {
        if let Some(buffer) = &self.buffer {
            let mut buffer = buffer
                .lock()
                .map_err(|e| TransportError::Poisoned(e.to_string()))?;
            buffer.push(format!("[{}] {} {}", self.name, event_type, body));
        } else {
            tracing::info!(transport = %self.name, event_type, body, "stored event sent");
        }
        Ok(())
    }
}

/// A transport that re-emits events on an `EventEmitter` for in-process listeners.
/// Requires the `emitter` feature to be enabled.
///
/// Listeners registered with `EventEmitter::on(event_type, |body: String| ..)`
/// receive the stored body; the emitter runs them on its own threads.
#[cfg(feature = "emitter")]
pub struct EmitterTransport {
    name: String,
    emitter: Mutex<EventEmitter>,
}

#[cfg(feature = "emitter")]
impl EmitterTransport {
    pub fn new(name: impl Into<String>, emitter: EventEmitter) -> Self {
        EmitterTransport {
            name: name.into(),
            emitter: Mutex::new(emitter),
        }
    }
}

#[cfg(feature = "emitter")]
impl Transport for EmitterTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, event_type: &str, body: &str) -> Result<(), TransportError> {
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|e| TransportError::Poisoned(e.to_string()))?;
        emitter.emit(event_type, body.to_string());
        Ok(())
    }
}
