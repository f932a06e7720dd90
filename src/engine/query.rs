//! Query planning and execution
//!
//! # Execution pipeline
//!
//! ```text
//! Criteria → scope keys → series fan-out → window filter → bucket → emit
//! ```
//!
//! Scoping intersects the metric index with the union of the tag indices:
//! a series is eligible when it carries *any* of the query tags. Window
//! filtering is minute-inclusive on both endpoints while bucketing uses
//! the caller's interval.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio_util::sync::CancellationToken;

use crate::engine::Engine;
use crate::error::Result;
use crate::model::time;
use crate::model::Point;

/// Query specification
///
/// Unset fields fall back to their defaults at execution time: `from` is
/// one hour before now, `until` is now, and the interval is clamped to at
/// least one minute.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    /// Metric to query
    pub metric: String,
    /// Tags restricting the scope; a series matches when it carries any
    /// of them
    pub tags: Vec<String>,
    /// Window start (inclusive at minute resolution)
    pub from: Option<DateTime<Utc>>,
    /// Window end (inclusive at minute resolution)
    pub until: Option<DateTime<Utc>>,
    /// Aggregation bucket width
    pub interval: Option<Duration>,
}

impl Criteria {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            ..Default::default()
        }
    }

    /// Builder: add a scope tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Builder: set the window start. Any timezone is accepted and
    /// normalized to UTC.
    pub fn from<Tz: TimeZone>(mut self, t: DateTime<Tz>) -> Self {
        self.from = Some(t.with_timezone(&Utc));
        self
    }

    /// Builder: set the window end. Any timezone is accepted and
    /// normalized to UTC.
    pub fn until<Tz: TimeZone>(mut self, t: DateTime<Tz>) -> Self {
        self.until = Some(t.with_timezone(&Utc));
        self
    }

    /// Builder: set the bucket interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    fn effective_from(&self) -> i64 {
        self.from
            .unwrap_or_else(|| Utc::now() - Duration::hours(1))
            .timestamp()
    }

    fn effective_until(&self) -> i64 {
        self.until.unwrap_or_else(Utc::now).timestamp()
    }

    fn effective_interval_secs(&self) -> i64 {
        match self.interval {
            Some(interval) if interval >= Duration::minutes(1) => interval.num_seconds(),
            _ => Duration::minutes(1).num_seconds(),
        }
    }
}

/// One aggregated bucket of a [`Engine::query`] result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bucket {
    /// Bucket start, a UTC-aligned multiple of the query interval
    pub timestamp: DateTime<Utc>,
    /// Sum of all in-scope counts within the bucket
    pub value: i64,
}

/// Query result, sorted ascending by bucket timestamp
pub type ResultSet = Vec<Bucket>;

impl Engine {
    /// Aggregate counts over the query window, bucketed by the criteria's
    /// interval
    pub async fn query(&self, criteria: &Criteria, cancel: &CancellationToken) -> Result<ResultSet> {
        let from = criteria.effective_from();
        let until = criteria.effective_until();
        let interval = criteria.effective_interval_secs();

        let keys = self
            .scope_keys(&criteria.metric, &criteria.tags, from, until, cancel)
            .await?;
        let keys: Vec<String> = keys.into_iter().collect();

        let mut buckets: BTreeMap<i64, i64> = BTreeMap::new();
        self.scan_series(&keys, from, until, cancel, |_, ts, value| {
            *buckets.entry(time::truncate(ts, interval)).or_insert(0) += value;
            Ok(())
        })
        .await?;

        Ok(buckets
            .into_iter()
            .map(|(secs, value)| Bucket {
                timestamp: time::to_datetime(secs),
                value,
            })
            .collect())
    }

    /// Aggregate counts into canonical points at bucket resolution, one
    /// per (metric, tag set, bucket), in unspecified order
    pub async fn query_points(
        &self,
        criteria: &Criteria,
        cancel: &CancellationToken,
    ) -> Result<Vec<Point>> {
        let from = criteria.effective_from();
        let until = criteria.effective_until();
        let interval = criteria.effective_interval_secs();

        let keys = self
            .scope_keys(&criteria.metric, &criteria.tags, from, until, cancel)
            .await?;
        let keys: Vec<String> = keys.into_iter().collect();

        let mut index: HashMap<(String, Vec<String>, i64), Point> = HashMap::new();
        self.scan_series(&keys, from, until, cancel, |series, ts, value| {
            let bucket = time::truncate(ts, interval);
            let id = (
                series.metric().to_string(),
                series.tags().to_vec(),
                bucket,
            );
            match index.entry(id) {
                Entry::Occupied(mut entry) => entry.get_mut().add_count(value),
                Entry::Vacant(entry) => {
                    entry.insert(Point::new_at(
                        series.metric(),
                        series.tags().to_vec(),
                        time::to_datetime(bucket),
                        value,
                    )?);
                }
            }
            Ok(())
        })
        .await?;

        Ok(index.into_values().collect())
    }

    /// Run a points query and persist the aggregates under
    /// `target_metric`, for precomputed rollups
    pub async fn query_store(
        &self,
        target_metric: &str,
        criteria: &Criteria,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut points = self.query_points(criteria, cancel).await?;
        for point in &mut points {
            point.set_metric(target_metric);
        }
        self.set(&points, cancel).await
    }

    /// Compute the set of series keys a query must read: the metric index
    /// scan, intersected with the union of the tag index scans when tags
    /// are given
    async fn scope_keys(
        &self,
        metric: &str,
        tags: &[String],
        from_secs: i64,
        until_secs: i64,
        cancel: &CancellationToken,
    ) -> Result<BTreeSet<String>> {
        let min_day = time::unix_day(from_secs);
        let max_day = time::unix_day(until_secs);

        let base = self
            .scan_index(&format!("m:{}", metric), min_day, max_day, cancel)
            .await?;
        if tags.is_empty() {
            return Ok(base);
        }

        let mut filters = BTreeSet::new();
        for tag in tags {
            let sub = self
                .scan_index(&format!("t:{}", tag), min_day, max_day, cancel)
                .await?;
            filters.extend(sub);
        }

        Ok(base.intersection(&filters).cloned().collect())
    }
}
