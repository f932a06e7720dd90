//! Error taxonomy
//!
//! Defines the fixed set of failure kinds surfaced to callers. Validation
//! errors reject a point before the store is ever touched; `InvalidKey` is
//! fatal to the query or compaction cycle that encountered it; `Backend`
//! aborts the current operation but leaves the engine usable.

use thiserror::Error;

/// Errors that can occur during point construction, queries, writes and
/// compaction
#[derive(Error, Debug)]
pub enum Error {
    /// Metric name is empty or longer than 50 characters
    #[error("invalid metric name")]
    InvalidMetric,

    /// Tag is empty, longer than 50 characters, or contains a character
    /// outside `[0-9A-Za-z:_-]`
    #[error("invalid tag name")]
    InvalidTag,

    /// A point carries more than 50 tags
    #[error("too many tags")]
    TooManyTags,

    /// Point text is not parseable (wrong field count, bad integer)
    #[error("bad point format")]
    BadFormat,

    /// A malformed series key was encountered during a scan or parse
    #[error("invalid series key")]
    InvalidKey,

    /// The operation was aborted via its cancellation token
    #[error("operation canceled")]
    Canceled,

    /// The backing store reported an error
    #[error("backend error: {0}")]
    Backend(#[from] redis::RedisError),
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
