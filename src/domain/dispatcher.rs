use super::HandlerError;

/// A process-local domain occurrence.
pub trait DomainEvent {
    /// Logical type name, e.g. `"order.placed"`.
    fn event_type(&self) -> &str;
}

/// Receives events from an [`EventDispatcher`].
pub trait EventHandler<E>: Send + Sync {
    fn handle(&self, event: &E) -> Result<(), HandlerError>;
}

impl<E, F> EventHandler<E> for F
where
    F: Fn(&E) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, event: &E) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Ordered, fail-fast fan-out of domain events.
///
/// Handlers are appended with [`subscribe`](Self::subscribe) while the
/// application is wired up and are never removed.
pub struct EventDispatcher<E> {
    handlers: Vec<Box<dyn EventHandler<E>>>,
}

impl<E> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventDispatcher<E> {
    pub fn new() -> Self {
        EventDispatcher {
            handlers: Vec::new(),
        }
    }

    /// Append `handler` to the end of the dispatch order.
    pub fn subscribe<H>(&mut self, handler: H)
    where
        H: EventHandler<E> + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Run every handler in registration order, stopping at the first error.
    pub fn dispatch(&self, event: &E) -> Result<(), HandlerError> {
        for handler in &self.handlers {
            handler.handle(event)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
