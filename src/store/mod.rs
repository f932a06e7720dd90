//! Storage backend abstraction
//!
//! The engine talks to its key/value store through the [`Store`] trait,
//! which captures exactly the command surface the data model needs:
//! pipelined mutations, batched sorted-set reads, cursor scans over sets
//! and the keyspace, and random member sampling.
//!
//! Two implementations are provided:
//!
//! - [`RedisStore`]: the production backend over an async Redis connection
//! - [`MemoryStore`]: an in-process backend with Redis-compatible
//!   semantics, used by the test suites and for embedded runs

mod command;
mod memory;
mod redis;

pub use command::Command;
pub use memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;

use crate::error::Result;

/// One page of a cursor scan
///
/// A returned cursor of zero signals the end of the iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor to pass to the next call
    pub cursor: u64,
    /// Members returned by this page
    pub members: Vec<String>,
}

/// Command surface the engine requires of its key/value store
#[async_trait]
pub trait Store: Send + Sync {
    /// Apply a batch of mutations in one pipelined round-trip, preserving
    /// order
    async fn apply(&self, commands: Vec<Command>) -> Result<()>;

    /// Fetch every `(member, score)` pair of each sorted set, in one
    /// round-trip for the whole batch
    ///
    /// Pairs are ordered by score, then member. A missing or expired key
    /// yields an empty vector at its position.
    async fn sorted_sets(&self, keys: &[String]) -> Result<Vec<Vec<(String, i64)>>>;

    /// One page of a cursor scan over the unordered set at `key`
    async fn scan_set(&self, key: &str, cursor: u64, count: usize) -> Result<ScanPage>;

    /// One page of a cursor scan over the keyspace, restricted to keys
    /// matching the glob `pattern`
    async fn scan_keys(&self, pattern: &str, cursor: u64, count: usize) -> Result<ScanPage>;

    /// Up to `count` distinct members of the unordered set at `key`,
    /// sampled without any ordering guarantee
    async fn random_members(&self, key: &str, count: usize) -> Result<Vec<String>>;
}
