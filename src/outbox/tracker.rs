use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{StoredEventId, TrackerError};
use crate::lock::{Lock, LockError};

/// Per-destination dispatch cursor plus the lock guarding it.
///
/// Implementations must make the lock exclusive across every process
/// instance that shares the same store; the cursor must survive restarts.
pub trait DispatchTracker: Send + Sync {
    /// Persist `id` as the last event delivered to `transport`.
    fn track_last_id(&self, transport: &str, id: &StoredEventId) -> Result<(), TrackerError>;

    /// Last event delivered to `transport`; `None` means start from the beginning.
    fn last_id(&self, transport: &str) -> Result<Option<StoredEventId>, TrackerError>;

    fn lock(&self) -> Result<(), LockError>;

    fn unlock(&self) -> Result<(), LockError>;
}

impl<D: DispatchTracker + ?Sized> DispatchTracker for Arc<D> {
    fn track_last_id(&self, transport: &str, id: &StoredEventId) -> Result<(), TrackerError> {
        (**self).track_last_id(transport, id)
    }

    fn last_id(&self, transport: &str) -> Result<Option<StoredEventId>, TrackerError> {
        (**self).last_id(transport)
    }

    fn lock(&self) -> Result<(), LockError> {
        (**self).lock()
    }

    fn unlock(&self) -> Result<(), LockError> {
        (**self).unlock()
    }
}

/// In-memory cursor table guarded by an injected [`Lock`].
///
/// [`with_lock`](Self::with_lock) gives another tracker over the same cursor
/// table with a different lock handle, which is how several senders (standing
/// in for several service instances) share one destination.
pub struct InMemoryDispatchTracker<L> {
    cursors: Arc<RwLock<HashMap<String, StoredEventId>>>,
    lock: L,
}

impl<L: Lock> InMemoryDispatchTracker<L> {
    pub fn new(lock: L) -> Self {
        InMemoryDispatchTracker {
            cursors: Arc::new(RwLock::new(HashMap::new())),
            lock,
        }
    }

    /// A tracker sharing this one's cursors but locking through `lock`.
    pub fn with_lock<M: Lock>(&self, lock: M) -> InMemoryDispatchTracker<M> {
        InMemoryDispatchTracker {
            cursors: Arc::clone(&self.cursors),
            lock,
        }
    }
}

impl<L: Lock> DispatchTracker for InMemoryDispatchTracker<L> {
    fn track_last_id(&self, transport: &str, id: &StoredEventId) -> Result<(), TrackerError> {
        let mut cursors = self
            .cursors
            .write()
            .map_err(|e| TrackerError::Poisoned(e.to_string()))?;
        cursors.insert(transport.to_string(), *id);
        Ok(())
    }

    fn last_id(&self, transport: &str) -> Result<Option<StoredEventId>, TrackerError> {
        let cursors = self
            .cursors
            .read()
            .map_err(|e| TrackerError::Poisoned(e.to_string()))?;
        Ok(cursors.get(transport).copied())
    }

    fn lock(&self) -> Result<(), LockError> {
        self.lock.lock()
    }

    fn unlock(&self) -> Result<(), LockError> {
        self.lock.unlock()
    }
}
