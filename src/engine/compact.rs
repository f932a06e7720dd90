//! Compaction
//!
//! Series shards expire through their TTL; the inverted indices that
//! reference them do not. One compaction cycle advances a persistent
//! cursor across the `m:*` / `t:*` keyspace by a single scan page,
//! samples up to 100 members of each returned set, and removes the
//! members whose series day has fallen out of the retention window.
//!
//! Sampling keeps a cycle cheap on large indices; repeated cycles
//! converge on a clean state and removals are idempotent, so concurrent
//! compaction from several callers is harmless.

use chrono::Utc;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::model::time;
use crate::model::Series;
use crate::store::{Command, Store};

/// Keyspace scan page per cycle
const SCAN_PAGE: usize = 20;

/// Members sampled per index set
const SAMPLE_SIZE: usize = 100;

impl Engine {
    /// Run one compaction cycle
    ///
    /// A member that does not parse as a series key aborts the cycle with
    /// `InvalidKey`; removals already queued are not flushed.
    pub async fn compact(&self, cancel: &CancellationToken) -> Result<()> {
        let cutoff = time::unix_day(Utc::now().timestamp() - self.retention_secs());

        let cursor = self.cursor().load(Ordering::Relaxed);
        let page = self.store().scan_keys("[mt]:*", cursor, SCAN_PAGE).await?;
        self.cursor().store(page.cursor, Ordering::Relaxed);

        let mut commands = Vec::new();
        for key in &page.members {
            if cancel.is_cancelled() {
                return Err(Error::Canceled);
            }

            for member in self.store().random_members(key, SAMPLE_SIZE).await? {
                let series: Series = member.parse()?;
                if series.unix_day() < cutoff {
                    commands.push(Command::SRem {
                        key: key.clone(),
                        member,
                    });
                }
            }
        }

        tracing::debug!(
            keys = page.members.len(),
            removals = commands.len(),
            "compaction cycle"
        );
        self.store().apply(commands).await
    }
}
