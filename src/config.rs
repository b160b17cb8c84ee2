//! Sender configuration.

use std::time::Duration;

use thiserror::Error;

/// Error raised while reading configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got {value:?}")]
    Invalid {
        var: String,
        expected: &'static str,
        value: String,
    },
}

/// Settings for an outbox [`Sender`](crate::outbox::Sender) and its lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderConfig {
    /// How often the sender checks for pending work (default: 1s).
    pub poll_interval: Duration,
    /// Name of the distributed lock guarding the destination.
    pub lock_name: String,
    /// How long `lock()` waits before giving up (default: 5s).
    pub lock_timeout: Duration,
}

impl Default for SenderConfig {
    fn default() -> Self {
        SenderConfig {
            poll_interval: Duration::from_secs(1),
            lock_name: "stored_event_sender".to_string(),
            lock_timeout: Duration::from_secs(5),
        }
    }
}

impl SenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_lock_name(mut self, name: impl Into<String>) -> Self {
        self.lock_name = name.into();
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Load from `RELAY_*` environment variables, falling back to defaults.
    ///
    /// | Env Var                   | Default               |
    /// |---------------------------|-----------------------|
    /// | `RELAY_POLL_INTERVAL_MS`  | `1000`                |
    /// | `RELAY_LOCK_NAME`         | `stored_event_sender` |
    /// | `RELAY_LOCK_TIMEOUT_SECS` | `5`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with("RELAY")
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable prefix.
    pub fn from_env_with(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(prefix, |var| std::env::var(var).ok())
    }

    fn from_lookup(
        prefix: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| format!("{prefix}_{name}");

        let poll_interval = match parse_u64(&var("POLL_INTERVAL_MS"), &lookup)? {
            Some(ms) => Duration::from_millis(ms),
            None => defaults.poll_interval,
        };
        let lock_timeout = match parse_u64(&var("LOCK_TIMEOUT_SECS"), &lookup)? {
            Some(secs) => Duration::from_secs(secs),
            None => defaults.lock_timeout,
        };
        let lock_name = lookup(&var("LOCK_NAME"))
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or(defaults.lock_name);

        Ok(SenderConfig {
            poll_interval,
            lock_name,
            lock_timeout,
        })
    }
}

fn parse_u64(
    var: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<u64>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::Invalid {
            var: var.to_string(),
            expected: "u64",
            value,
        })
}
