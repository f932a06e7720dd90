//! Batch write path
//!
//! Every point in a batch produces one mode-specific sorted-set write plus
//! the index adds that keep invariant 1 of the data model: the series key
//! is always a member of its metric index and of each of its tag indices.
//! Each distinct series key gets one TTL refresh. The whole batch goes to
//! the store as a single pipelined flush, so a series and its index
//! membership appear together.

use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::model::Point;
use crate::store::{Command, Store};

/// Per-member command choice for a batch write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Set,
    Increment,
}

impl Engine {
    /// Replace the stored count for each point's `(series, minute)` slot
    ///
    /// Duplicate slots within one batch are applied in slice order, so the
    /// later point wins.
    pub async fn set(&self, points: &[Point], cancel: &CancellationToken) -> Result<()> {
        self.write_points(points, WriteMode::Set, cancel).await
    }

    /// Add each point's count to its `(series, minute)` slot, starting
    /// from zero if absent
    pub async fn increment(&self, points: &[Point], cancel: &CancellationToken) -> Result<()> {
        self.write_points(points, WriteMode::Increment, cancel).await
    }

    async fn write_points(
        &self,
        points: &[Point],
        mode: WriteMode,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let mut commands = Vec::with_capacity(points.len() * 3);
        let mut touched: HashSet<String> = HashSet::with_capacity(points.len());

        for point in points {
            if cancel.is_cancelled() {
                return Err(Error::Canceled);
            }

            let key = point.key_name();
            let member = point.member_name();
            commands.push(match mode {
                WriteMode::Set => Command::ZSet {
                    key: key.clone(),
                    member,
                    value: point.count(),
                },
                WriteMode::Increment => Command::ZIncr {
                    key: key.clone(),
                    member,
                    delta: point.count(),
                },
            });

            commands.push(Command::SAdd {
                key: format!("m:{}", point.metric()),
                member: key.clone(),
            });
            for tag in point.tags() {
                commands.push(Command::SAdd {
                    key: format!("t:{}", tag),
                    member: key.clone(),
                });
            }

            touched.insert(key);
        }

        let ttl_secs = self.retention_secs();
        for key in touched {
            commands.push(Command::Expire { key, ttl_secs });
        }

        tracing::debug!(
            points = points.len(),
            commands = commands.len(),
            "flushing write pipeline"
        );
        self.store().apply(commands).await
    }
}
