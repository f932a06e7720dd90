//! # Tally
//!
//! Tag-indexed counter time-series storage on Redis.
//!
//! Tally ingests discrete counter observations (a metric name, a set of
//! string tags, a second-resolution UTC timestamp and a signed count),
//! persists them compactly in Redis sorted sets sharded by day, and
//! answers range queries that aggregate counts over a window, optionally
//! restricted by tags, bucketed into a caller-chosen interval.
//!
//! ## Features
//!
//! - **Compact storage**: one sorted set per (series, day), members keyed
//!   by minute of day, so a shard never exceeds 1440 entries
//! - **Inverted indices**: `m:<metric>` and `t:<tag>` sets locate relevant
//!   series without keyspace globbing
//! - **Free-running retention**: per-shard TTLs evict old data; a
//!   sampling compactor lazily prunes stale index references
//! - **Cooperative cancellation**: every long-running operation checks a
//!   cancellation token between store round-trips
//!
//! ## Modules
//!
//! - [`model`]: points, series identity, calendar helpers
//! - [`store`]: the backend seam (Redis and in-memory implementations)
//! - [`engine`]: write, query and compaction paths
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tally::{Criteria, Engine, Point};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Engine::connect("127.0.0.1:6379", 0).await?;
//!     let cancel = CancellationToken::new();
//!
//!     // Ingest counters
//!     let point = Point::parse("cpu,host:a,dc:x 1414141414 2")?;
//!     db.increment(&[point], &cancel).await?;
//!
//!     // Aggregate the last hour into minute buckets
//!     let results = db.query(&Criteria::new("cpu").tag("host:a"), &cancel).await?;
//!     for bucket in results {
//!         println!("{} {}", bucket.timestamp, bucket.value);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod store;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, LoggingConfig, StoreConfig};

pub use engine::{Bucket, Criteria, Engine, ResultSet, DEFAULT_RETENTION_DAYS};

pub use error::{Error, Result};

pub use model::{Point, Series, MAX_METRIC_LEN, MAX_TAGS, MAX_TAG_LEN};

pub use store::{Command, MemoryStore, RedisStore, ScanPage, Store};
