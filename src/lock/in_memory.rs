use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::{Lock, LockError};

type Tokens = HashMap<String, Option<u64>>;

struct Shared {
    // name -> current holder; `None` once created but released
    tokens: Mutex<Tokens>,
    wake: Condvar,
    next_owner: AtomicU64,
}

impl Shared {
    fn tokens(&self) -> Result<MutexGuard<'_, Tokens>, LockError> {
        self.tokens
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))
    }
}

/// In-memory backing store for named locks.
///
/// Cloning yields another handle onto the same tokens. Each call to
/// [`lock`](Self::lock) returns a handle with its own owner identity, so two
/// handles for the same name exclude each other the way two service instances
/// sharing a database would.
#[derive(Clone)]
pub struct InMemoryLockRegistry {
    shared: Arc<Shared>,
}

impl Default for InMemoryLockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLockRegistry {
    pub fn new() -> Self {
        InMemoryLockRegistry {
            shared: Arc::new(Shared {
                tokens: Mutex::new(HashMap::new()),
                wake: Condvar::new(),
                next_owner: AtomicU64::new(1),
            }),
        }
    }

    /// Create a new holder for the token `name`, waiting at most `timeout`
    /// in [`Lock::lock`].
    pub fn lock(&self, name: impl Into<String>, timeout: Duration) -> InMemoryLock {
        InMemoryLock {
            shared: Arc::clone(&self.shared),
            name: name.into(),
            owner: self.shared.next_owner.fetch_add(1, Ordering::Relaxed),
            timeout,
        }
    }

    /// Whether anyone currently holds `name`.
    pub fn is_held(&self, name: &str) -> Result<bool, LockError> {
        Ok(matches!(self.shared.tokens()?.get(name), Some(Some(_))))
    }
}

/// One holder's view of a named token in an [`InMemoryLockRegistry`].
pub struct InMemoryLock {
    shared: Arc<Shared>,
    name: String,
    owner: u64,
    timeout: Duration,
}

impl InMemoryLock {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // Returns true when the token was free (or already ours) and is now ours.
    fn claim(&self, tokens: &mut Tokens) -> bool {
        let holder = tokens.entry(self.name.clone()).or_insert(None);
        if matches!(holder, Some(owner) if *owner != self.owner) {
            return false;
        }
        *holder = Some(self.owner);
        true
    }
}

impl Lock for InMemoryLock {
    fn lock(&self) -> Result<(), LockError> {
        let deadline = Instant::now() + self.timeout;
        let mut tokens = self.shared.tokens()?;

        while !self.claim(&mut tokens) {
            let now = Instant::now();
            if now >= deadline {
                return Err(LockError::Timeout {
                    name: self.name.clone(),
                    timeout: self.timeout,
                });
            }
            tokens = self
                .shared
                .wake
                .wait_timeout(tokens, deadline - now)
                .map_err(|e| LockError::Poisoned(e.to_string()))?
                .0;
        }
        Ok(())
    }

    fn try_lock(&self) -> Result<bool, LockError> {
        let mut tokens = self.shared.tokens()?;
        Ok(self.claim(&mut tokens))
    }

    fn unlock(&self) -> Result<(), LockError> {
        let mut tokens = self.shared.tokens()?;
        match tokens.get_mut(&self.name) {
            None => Err(LockError::NotFound(self.name.clone())),
            Some(holder) if *holder == Some(self.owner) => {
                *holder = None;
                self.shared.wake.notify_all();
                Ok(())
            }
            Some(_) => Err(LockError::NotAcquired(self.name.clone())),
        }
    }
}
