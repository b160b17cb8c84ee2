use std::sync::Arc;

use super::{StoreError, StoredEvent, StoredEventId};

/// Append-only log of stored events.
///
/// `get_all_after` answers in append order. Ids are random, so
/// implementations must keep their own insertion sequence (an auto-increment
/// column, a log offset) and resolve the cursor against it.
pub trait Store: Send + Sync {
    /// Durably persist one event. Safe to call from several threads.
    fn append(&self, event: StoredEvent) -> Result<(), StoreError>;

    /// Events appended strictly after `cursor`; the whole log for `None`.
    fn get_all_after(&self, cursor: Option<&StoredEventId>)
        -> Result<Vec<StoredEvent>, StoreError>;
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn append(&self, event: StoredEvent) -> Result<(), StoreError> {
        (**self).append(event)
    }

    fn get_all_after(
        &self,
        cursor: Option<&StoredEventId>,
    ) -> Result<Vec<StoredEvent>, StoreError> {
        (**self).get_all_after(cursor)
    }
}
