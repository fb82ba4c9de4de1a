use std::time::Duration;

use anyhow::Result;

/// Minimal key-value capability the service needs from its backing store.
///
/// Methods are blocking; async callers run them on `spawn_blocking`.
/// Expired keys behave exactly like absent keys.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Upsert `key`. A `None` ttl makes the key permanent, clearing any
    /// expiry a previous write left behind.
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    fn exists(&self, key: &str) -> Result<bool>;

    /// Apply every entry of `batch` atomically.
    ///
    /// If the batch carries a claim key that is currently live, nothing is
    /// written and `Ok(false)` is returned.
    fn write_batch(&self, batch: &Batch) -> Result<bool>;

    /// Drop expired keys, returning how many were removed.
    fn purge_expired(&self) -> Result<usize>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub ttl: Option<Duration>,
}

/// A set of writes committed together, optionally guarded by a claim key.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub claim: Option<String>,
    pub entries: Vec<Entry>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only commit if `key` is absent (or expired) at commit time.
    pub fn claim(mut self, key: impl Into<String>) -> Self {
        self.claim = Some(key.into());
        self
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>, ttl: Option<Duration>) -> Self {
        self.entries.push(Entry {
            key: key.into(),
            value: value.into(),
            ttl,
        });
        self
    }
}
