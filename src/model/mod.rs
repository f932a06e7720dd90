//! Core data model
//!
//! - **point**: the input unit, its grammar and storage names
//! - **series**: the (metric, tags, epoch-day) storage identity
//! - **time**: epoch-day and minute-of-day derivation

pub mod point;
pub mod series;
pub mod time;

pub use point::{Point, MAX_METRIC_LEN, MAX_TAGS, MAX_TAG_LEN};
pub use series::Series;
