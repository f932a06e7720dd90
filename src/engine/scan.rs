//! Index and series scanning
//!
//! The inverted indices are the only way series keys are discovered; the
//! engine never globs the `s:` keyspace. `scan_index` pages through one
//! index set and keeps the members whose day falls inside the query range.
//! `scan_series` then fans out over the scoped sorted sets in a single
//! pipelined batch and feeds every in-window sample to a callback.

use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::model::time::{self, SECONDS_PER_MINUTE};
use crate::model::Series;
use crate::store::Store;

/// Page size for index scans
pub(crate) const SCAN_PAGE_SIZE: usize = 1_000;

impl Engine {
    /// Collect every member of the inverted-index set at `key` whose
    /// series day lies in `[min_day, max_day]`.
    ///
    /// Members that do not parse as series keys abort the scan with
    /// `InvalidKey`.
    pub(crate) async fn scan_index(
        &self,
        key: &str,
        min_day: i64,
        max_day: i64,
        cancel: &CancellationToken,
    ) -> Result<BTreeSet<String>> {
        let mut matches = BTreeSet::new();
        let mut cursor = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Canceled);
            }

            let page = self.store().scan_set(key, cursor, SCAN_PAGE_SIZE).await?;
            for member in page.members {
                let series: Series = member.parse()?;
                if series.unix_day() >= min_day && series.unix_day() <= max_day {
                    matches.insert(member);
                }
            }

            cursor = page.cursor;
            if cursor == 0 {
                return Ok(matches);
            }
        }
    }

    /// Fan out over series sorted sets and invoke `visit` for every sample
    /// whose timestamp lies in the minute-truncated window
    /// `[from, until]`, both endpoints inclusive.
    ///
    /// Keys whose sorted set has been evicted contribute nothing.
    pub(crate) async fn scan_series<F>(
        &self,
        keys: &[String],
        from_secs: i64,
        until_secs: i64,
        cancel: &CancellationToken,
        mut visit: F,
    ) -> Result<()>
    where
        F: FnMut(&Series, i64, i64) -> Result<()>,
    {
        let min = time::truncate(from_secs, SECONDS_PER_MINUTE);
        let max = time::truncate(until_secs, SECONDS_PER_MINUTE);

        let mut series = Vec::with_capacity(keys.len());
        for key in keys {
            if cancel.is_cancelled() {
                return Err(Error::Canceled);
            }
            series.push(key.parse::<Series>()?);
        }

        let replies = self.store().sorted_sets(keys).await?;
        for (ser, pairs) in series.iter().zip(replies) {
            if cancel.is_cancelled() {
                return Err(Error::Canceled);
            }

            let base = ser.start_secs();
            for (member, score) in pairs {
                let minute: i64 = member.parse().unwrap_or(0);
                let ts = base + minute * SECONDS_PER_MINUTE;
                if ts < min || ts > max {
                    continue;
                }
                visit(ser, ts, score)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;
    use crate::store::MemoryStore;
    use crate::store::{Command, Store};
    use std::sync::Arc;

    fn engine() -> (Engine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Engine::with_store(store.clone()), store)
    }

    async fn seed(engine: &Engine, raw: &[&str]) {
        let cancel = CancellationToken::new();
        let points: Vec<Point> = raw.iter().map(|s| Point::parse(s).unwrap()).collect();
        engine.set(&points, &cancel).await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_index_filters_by_day() {
        let (engine, _store) = engine();
        let cancel = CancellationToken::new();
        seed(
            &engine,
            &[
                "cpu,a 1414141414 1", // day 16367
                "cpu,a 1818181818 1", // day 21043
            ],
        )
        .await;

        let all = engine
            .scan_index("m:cpu", 16367, 21043, &cancel)
            .await
            .unwrap();
        assert_eq!(
            all.into_iter().collect::<Vec<_>>(),
            vec!["s:cpu,a:16367", "s:cpu,a:21043"]
        );

        let early = engine
            .scan_index("m:cpu", 16000, 16999, &cancel)
            .await
            .unwrap();
        assert_eq!(early.into_iter().collect::<Vec<_>>(), vec!["s:cpu,a:16367"]);

        let none = engine.scan_index("m:cpu", 0, 100, &cancel).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_scan_index_missing_key_is_empty() {
        let (engine, _store) = engine();
        let cancel = CancellationToken::new();

        let matches = engine
            .scan_index("m:absent", 0, i64::MAX, &cancel)
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_scan_index_rejects_corrupt_member() {
        let (engine, store) = engine();
        let cancel = CancellationToken::new();

        store
            .apply(vec![Command::SAdd {
                key: "m:cpu".into(),
                member: "not-a-series-key".into(),
            }])
            .await
            .unwrap();

        let result = engine.scan_index("m:cpu", 0, i64::MAX, &cancel).await;
        assert!(matches!(result, Err(Error::InvalidKey)));
    }

    #[tokio::test]
    async fn test_scan_series_window_is_minute_inclusive() {
        let (engine, _store) = engine();
        let cancel = CancellationToken::new();
        seed(
            &engine,
            &[
                "cpu 1414141200 1", // 09:00
                "cpu 1414141260 2", // 09:01
                "cpu 1414141320 4", // 09:02
            ],
        )
        .await;

        let keys = vec!["s:cpu:16367".to_string()];
        let mut seen = Vec::new();
        engine
            .scan_series(&keys, 1414141259, 1414141299, &cancel, |_, ts, value| {
                seen.push((ts, value));
                Ok(())
            })
            .await
            .unwrap();

        // from truncates down into minute 09:00, until into 09:01; a
        // sample exactly on the truncated until is included
        assert_eq!(seen, vec![(1414141200, 1), (1414141260, 2)]);
    }

    #[tokio::test]
    async fn test_scan_series_evicted_key_is_empty() {
        let (engine, _store) = engine();
        let cancel = CancellationToken::new();

        let keys = vec!["s:cpu:16367".to_string()];
        let mut calls = 0;
        engine
            .scan_series(&keys, 0, i64::MAX - 1, &cancel, |_, _, _| {
                calls += 1;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_scan_series_rejects_bad_key() {
        let (engine, _store) = engine();
        let cancel = CancellationToken::new();

        let keys = vec!["bogus".to_string()];
        let result = engine
            .scan_series(&keys, 0, i64::MAX - 1, &cancel, |_, _, _| Ok(()))
            .await;
        assert!(matches!(result, Err(Error::InvalidKey)));
    }

    #[tokio::test]
    async fn test_scan_cancellation() {
        let (engine, _store) = engine();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = engine.scan_index("m:cpu", 0, 1, &cancel).await;
        assert!(matches!(result, Err(Error::Canceled)));
    }
}
