//! In-memory key-value cache.

use eventform_core::providers::{KeyValueCache, Readiness};
use eventform_core::{IntakeError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct Entries {
    /// Time elapsed on the manual clock.
    now: Duration,
    /// Value and absolute expiry, `None` for keys without a TTL.
    values: HashMap<String, (String, Option<Duration>)>,
}

impl Entries {
    fn live(&mut self, key: &str) -> Option<&mut String> {
        let now = self.now;
        let expired = matches!(self.values.get(key), Some((_, Some(expiry))) if *expiry <= now);
        if expired {
            self.values.remove(key);
        }
        self.values.get_mut(key).map(|(value, _)| value)
    }
}

/// Redis stand-in.
///
/// Time only moves when [`advance`](Self::advance) is called, so TTL tests
/// are deterministic. [`set_failing`](Self::set_failing) makes every call
/// return [`IntakeError::Cache`].
#[derive(Debug, Clone, Default)]
pub struct MockCache {
    entries: Arc<Mutex<Entries>>,
    failing: Arc<AtomicBool>,
}

impl MockCache {
    /// Create an empty cache at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a live value without going through the trait.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().live(key).cloned()
    }

    /// Move the manual clock forward.
    pub fn advance(&self, by: Duration) {
        self.entries.lock().unwrap().now += by;
    }

    /// Simulate an outage.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let keys: Vec<String> = entries.values.keys().cloned().collect();
        keys.iter().filter(|key| entries.live(key).is_some()).count()
    }

    /// Whether no live key remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, operation: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IntakeError::Cache(format!("{operation}: connection refused")));
        }
        Ok(())
    }
}

impl KeyValueCache for MockCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check("GET")?;
        Ok(self.peek(key))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.check("SET")?;
        let mut entries = self.entries.lock().unwrap();
        let expiry = entries.now + ttl;
        entries
            .values
            .insert(key.to_string(), (value.to_string(), Some(expiry)));
        Ok(())
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        self.check("SET NX")?;
        let mut entries = self.entries.lock().unwrap();
        if entries.live(key).is_some() {
            return Ok(false);
        }
        let expiry = entries.now + ttl;
        entries
            .values
            .insert(key.to_string(), (value.to_string(), Some(expiry)));
        Ok(true)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        self.check("INCR")?;
        let mut entries = self.entries.lock().unwrap();
        let next = match entries.live(key).cloned() {
            Some(current) => {
                current
                    .parse::<i64>()
                    .map_err(|_| IntakeError::Cache(format!("INCR: {key} is not an integer")))?
                    + 1
            }
            None => 1,
        };
        // INCR keeps any existing TTL
        let expiry = entries.values.get(key).and_then(|(_, expiry)| *expiry);
        entries
            .values
            .insert(key.to_string(), (next.to_string(), expiry));
        Ok(next)
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.check("DEL")?;
        self.entries.lock().unwrap().values.remove(key);
        Ok(())
    }
}

impl Readiness for MockCache {
    async fn check_ready(&self) -> Result<()> {
        self.check("PING")
    }
}
