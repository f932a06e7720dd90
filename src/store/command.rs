//! Mutation commands queued into a pipelined flush
//!
//! The write engine reduces every operation to a sequence of these
//! commands; a backend applies the whole sequence in one round-trip,
//! preserving order.

/// A single mutation against the backing store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the score of `member` in the sorted set at `key`
    ZSet {
        key: String,
        member: String,
        value: i64,
    },

    /// Add `delta` to the score of `member` in the sorted set at `key`,
    /// starting from zero if absent
    ZIncr {
        key: String,
        member: String,
        delta: i64,
    },

    /// Add `member` to the unordered set at `key`
    SAdd { key: String, member: String },

    /// Remove `member` from the unordered set at `key`
    SRem { key: String, member: String },

    /// Refresh the TTL of `key`
    Expire { key: String, ttl_secs: i64 },
}
