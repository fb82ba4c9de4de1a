//! Fakes for the store and payment processor, shared by unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, bail};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use soapbox_db::{Batch, SqliteStore, Store};
use soapbox_types::models::PaymentStatus;

use crate::payment::PaymentVerifier;

/// In-memory SQLite store that can be switched into a failing state and
/// counts write calls.
pub struct FlakyStore {
    inner: SqliteStore,
    broken: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            broken: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        })
    }

    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw `expires_at` column for `key`; `None` if the key never expires.
    pub fn expires_at(&self, key: &str) -> Option<i64> {
        self.inner
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT expires_at FROM kv WHERE key = ?1", [key], |r| r.get(0))?)
            })
            .unwrap()
    }

    fn check(&self) -> Result<()> {
        if self.broken.load(Ordering::SeqCst) {
            bail!("store unavailable");
        }
        Ok(())
    }
}

impl Store for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        self.check()?;
        self.inner.exists(key)
    }

    fn write_batch(&self, batch: &Batch) -> Result<bool> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_batch(batch)
    }

    fn purge_expired(&self) -> Result<usize> {
        self.check()?;
        self.inner.purge_expired()
    }
}

/// Verifier answering from a fixed table; unknown ids are `NotFound`.
#[derive(Default)]
pub struct ScriptedVerifier {
    sessions: HashMap<String, PaymentStatus>,
    failing: bool,
    lookups: AtomicUsize,
}

impl ScriptedVerifier {
    pub fn with(mut self, session_id: &str, status: PaymentStatus) -> Self {
        self.sessions.insert(session_id.to_string(), status);
        self
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl PaymentVerifier for ScriptedVerifier {
    fn status<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<PaymentStatus>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let result = if self.failing {
            Err(anyhow::anyhow!("payment processor unreachable"))
        } else {
            Ok(self
                .sessions
                .get(session_id)
                .copied()
                .unwrap_or(PaymentStatus::NotFound))
        };
        async move { result }.boxed()
    }
}
