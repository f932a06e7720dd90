//! Point grammar
//!
//! A point is a single counter observation: a metric name, a canonical set
//! of tags, a second-resolution UTC timestamp and a signed count.
//!
//! # Textual form
//!
//! ```text
//! <metric>[,<tag>[,<tag>…]] <unix_seconds> <count>\n
//! ```
//!
//! Surrounding whitespace is trimmed, exactly three space-separated fields
//! are required and integers are base 10. Rendering emits the trailing
//! newline; parsing accepts its absence.
//!
//! # Canonicalization
//!
//! Tags are sorted ascending on construction; the original order is not
//! preserved and not observable. Duplicate tags are kept verbatim.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::time;

/// Maximum length of a metric name, in bytes
pub const MAX_METRIC_LEN: usize = 50;

/// Maximum length of a single tag, in bytes
pub const MAX_TAG_LEN: usize = 50;

/// Maximum number of tags on one point
pub const MAX_TAGS: usize = 50;

/// A single counter observation
///
/// Fields are private: every `Point` in existence has passed validation
/// and carries its tags in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Point {
    metric: String,
    tags: Vec<String>,
    /// Unix seconds, UTC
    timestamp: i64,
    count: i64,
}

impl Point {
    /// Create a point stamped with the current time
    pub fn new(metric: impl Into<String>, tags: Vec<String>, count: i64) -> Result<Self> {
        Self::new_at(metric, tags, Utc::now(), count)
    }

    /// Create a point at a specific time
    ///
    /// Any timezone is accepted; the instant is normalized to UTC before
    /// day and minute derivation.
    pub fn new_at<Tz: TimeZone>(
        metric: impl Into<String>,
        tags: Vec<String>,
        at: DateTime<Tz>,
        count: i64,
    ) -> Result<Self> {
        Self::validated(metric.into(), tags, at.timestamp(), count)
    }

    /// Parse a point from its textual form
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.trim().splitn(3, ' ').collect();
        if parts.len() != 3 {
            return Err(Error::BadFormat);
        }

        let mut names = parts[0].split(',');
        let metric = names.next().unwrap_or("").to_string();
        let tags: Vec<String> = names.map(str::to_string).collect();

        let secs: i64 = parts[1].parse().map_err(|_| Error::BadFormat)?;
        let count: i64 = parts[2].parse().map_err(|_| Error::BadFormat)?;

        Self::validated(metric, tags, secs, count)
    }

    fn validated(metric: String, mut tags: Vec<String>, secs: i64, count: i64) -> Result<Self> {
        if metric.is_empty() || metric.len() > MAX_METRIC_LEN {
            return Err(Error::InvalidMetric);
        }
        if tags.len() > MAX_TAGS {
            return Err(Error::TooManyTags);
        }
        for tag in &tags {
            if tag.is_empty() || tag.len() > MAX_TAG_LEN {
                return Err(Error::InvalidTag);
            }
            if !tag.chars().all(valid_tag_char) {
                return Err(Error::InvalidTag);
            }
        }

        tags.sort();
        Ok(Self {
            metric,
            tags,
            timestamp: secs,
            count,
        })
    }

    /// Metric name
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Tags in canonical (ascending) order
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Observation time
    pub fn timestamp(&self) -> DateTime<Utc> {
        time::to_datetime(self.timestamp)
    }

    /// Observation time as unix seconds
    pub fn unix_seconds(&self) -> i64 {
        self.timestamp
    }

    /// Signed count
    pub fn count(&self) -> i64 {
        self.count
    }

    /// The series label: metric followed by the canonical tags, comma
    /// separated
    pub fn series(&self) -> String {
        let mut s = self.metric.clone();
        for tag in &self.tags {
            s.push(',');
            s.push_str(tag);
        }
        s
    }

    /// The sorted-set key this point is stored under:
    /// `s:<series>:<unix_day>`
    pub fn key_name(&self) -> String {
        format!("s:{}:{}", self.series(), time::unix_day(self.timestamp))
    }

    /// The sorted-set member this point is stored as: the zero-padded
    /// minute of day
    pub fn member_name(&self) -> String {
        format!("{:04}", time::minute_of_day(self.timestamp))
    }

    pub(crate) fn set_metric(&mut self, metric: &str) {
        self.metric = metric.to_string();
    }

    pub(crate) fn add_count(&mut self, delta: i64) {
        self.count += delta;
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.series(), self.timestamp, self.count)
    }
}

impl FromStr for Point {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn valid_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ':' || c == '-' || c == '_'
}
