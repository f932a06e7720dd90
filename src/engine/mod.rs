//! Counter engine
//!
//! Orchestrates the write, query and compaction paths on top of a
//! [`Store`]:
//!
//! ```text
//! Write Path:   Point → pipeline (ZADD/ZINCRBY + SADD + EXPIRE) → flush
//! Query Path:   Criteria → scope (m:<metric> ∩ ⋃ t:<tag>) → ZRANGE fan-out
//!               → minute-window filter → interval bucketing
//! Compaction:   SCAN [mt]:* → sample members → SREM references older than
//!               the retention window
//! ```
//!
//! The engine owns no background tasks; every operation is an async fn
//! driven by the caller, checking its cancellation token between pages of
//! a scan and between pipelined batches. Concurrent callers are safe: the
//! only shared mutable state is the compaction cursor.

mod compact;
mod query;
mod scan;
mod write;

pub use query::{Bucket, Criteria, ResultSet};

use chrono::Duration;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::store::{RedisStore, Store};

/// Default retention window, in days
pub const DEFAULT_RETENTION_DAYS: i64 = 35;

/// The counter time-series engine
///
/// Cheap to share behind an [`Arc`]; all operations take `&self`.
pub struct Engine {
    store: Arc<dyn Store>,
    retention: Duration,
    /// Compaction cursor, advanced one scan page per cycle
    cursor: AtomicU64,
}

impl Engine {
    /// Connect to a Redis endpoint, selecting the given logical database
    pub async fn connect(addr: &str, database: i64) -> Result<Self> {
        let store = RedisStore::connect(addr, database).await?;
        Ok(Self::with_store(Arc::new(store)))
    }

    /// Build an engine from a loaded [`Config`]
    pub async fn from_config(config: &Config) -> Result<Self> {
        let engine = Self::connect(&config.store.addr, config.store.database).await?;
        Ok(engine.retention(Duration::days(config.store.retention_days)))
    }

    /// Build an engine over any [`Store`] implementation
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            retention: Duration::days(DEFAULT_RETENTION_DAYS),
            cursor: AtomicU64::new(0),
        }
    }

    /// Builder: set the retention window
    ///
    /// Drives both the TTL applied on writes and the compaction cutoff.
    pub fn retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub(crate) fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub(crate) fn retention_secs(&self) -> i64 {
        self.retention.num_seconds()
    }

    pub(crate) fn cursor(&self) -> &AtomicU64 {
        &self.cursor
    }
}
