use std::time::Duration;

use anyhow::Result;
use rusqlite::Connection;
use tracing::debug;

use crate::SqliteStore;
use crate::store::{Batch, Store};

impl Store for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_at(key, now())
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.set_at(key, value, ttl, now())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get_at(key, now())?.is_some())
    }

    fn write_batch(&self, batch: &Batch) -> Result<bool> {
        self.write_batch_at(batch, now())
    }

    fn purge_expired(&self) -> Result<usize> {
        self.purge_expired_at(now())
    }
}

impl SqliteStore {
    fn get_at(&self, key: &str, now: i64) -> Result<Option<String>> {
        self.with_conn(|conn| query_live_value(conn, key, now))
    }

    fn set_at(&self, key: &str, value: &str, ttl: Option<Duration>, now: i64) -> Result<()> {
        self.with_conn(|conn| upsert(conn, key, value, expires_at(ttl, now)))
    }

    fn write_batch_at(&self, batch: &Batch, now: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            if let Some(claim) = &batch.claim {
                if query_live_value(&tx, claim, now)?.is_some() {
                    debug!("Batch claim on '{}' lost, rolling back", claim);
                    // Dropping the transaction rolls it back.
                    return Ok(false);
                }
            }

            for entry in &batch.entries {
                upsert(&tx, &entry.key, &entry.value, expires_at(entry.ttl, now))?;
            }

            tx.commit()?;
            Ok(true)
        })
    }

    fn purge_expired_at(&self, now: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM kv WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                [now],
            )?;
            Ok(removed)
        })
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn expires_at(ttl: Option<Duration>, now: i64) -> Option<i64> {
    ttl.map(|ttl| now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)))
}

fn query_live_value(conn: &Connection, key: &str, now: i64) -> Result<Option<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT value FROM kv WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
    )?;

    let value = stmt
        .query_row(rusqlite::params![key, now], |row| row.get(0))
        .optional()?;

    Ok(value)
}

fn upsert(conn: &Connection, key: &str, value: &str, expires_at: Option<i64>) -> Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value, expires_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
        rusqlite::params![key, value, expires_at],
    )?;
    Ok(())
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
