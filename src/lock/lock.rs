use super::LockError;

/// A single named lock as seen by one holder.
///
/// `lock` blocks for at most the implementation's timeout and fails with
/// [`LockError::Timeout`] when the token stays held elsewhere. Releasing a
/// token that was never created is [`LockError::NotFound`]; releasing one this
/// holder does not own is [`LockError::NotAcquired`].
pub trait Lock: Send + Sync {
    /// Acquire the lock, blocking up to the configured timeout.
    fn lock(&self) -> Result<(), LockError>;

    /// Try to acquire the lock without blocking.
    /// Returns `Ok(true)` if acquired, `Ok(false)` if held by someone else.
    fn try_lock(&self) -> Result<bool, LockError>;

    /// Release the lock.
    fn unlock(&self) -> Result<(), LockError>;
}

impl<L: Lock + ?Sized> Lock for Box<L> {
    fn lock(&self) -> Result<(), LockError> {
        (**self).lock()
    }

    fn try_lock(&self) -> Result<bool, LockError> {
        (**self).try_lock()
    }

    fn unlock(&self) -> Result<(), LockError> {
        (**self).unlock()
    }
}
