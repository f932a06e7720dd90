//! Series identity
//!
//! A series is the triple (metric, canonical tag set, epoch day), the unit
//! of physical storage. Its storage key is `s:<metric>[,<tag>…]:<unix_day>`
//! and this module parses such keys back into their parts.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::time;

/// Identity of one day-shard of a logical time-series
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Series {
    metric: String,
    tags: Vec<String>,
    unix_day: i64,
}

impl Series {
    /// Metric name
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Tags in canonical order, as recorded in the key
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Epoch day of this shard
    pub fn unix_day(&self) -> i64 {
        self.unix_day
    }

    /// Midnight UTC of this shard, in unix seconds
    pub(crate) fn start_secs(&self) -> i64 {
        time::day_start(self.unix_day)
    }
}

impl FromStr for Series {
    type Err = Error;

    /// Parse a series storage key.
    ///
    /// Rules: the key starts with `s:`, the last `:` splits off a non-empty
    /// unsigned base-10 day, the remainder is a non-empty metric followed
    /// by comma-separated tags, and no spaces appear anywhere.
    fn from_str(key: &str) -> Result<Self> {
        let rest = key.strip_prefix("s:").ok_or(Error::InvalidKey)?;
        if rest.contains(' ') {
            return Err(Error::InvalidKey);
        }

        let piv = rest.rfind(':').ok_or(Error::InvalidKey)?;
        if piv == 0 {
            return Err(Error::InvalidKey);
        }

        let day = &rest[piv + 1..];
        if day.is_empty() || !day.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidKey);
        }
        let unix_day: i64 = day.parse().map_err(|_| Error::InvalidKey)?;

        let mut names = rest[..piv].split(',');
        let metric = match names.next() {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => return Err(Error::InvalidKey),
        };
        let tags: Vec<String> = names.map(str::to_string).collect();

        Ok(Self {
            metric,
            tags,
            unix_day,
        })
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s:{}", self.metric)?;
        for tag in &self.tags {
            write!(f, ",{}", tag)?;
        }
        write!(f, ":{}", self.unix_day)
    }
}
