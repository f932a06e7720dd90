//! Redis-backed store
//!
//! Wraps an async connection manager and maps the [`Store`] surface onto
//! the Redis command set. All multi-command operations go through a single
//! pipeline so the server processes them in order with one round-trip.

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::error::Result;
use crate::store::{Command, ScanPage, Store};

/// Production [`Store`] implementation over Redis
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to a Redis endpoint, selecting the given logical database
    ///
    /// The connection manager reconnects transparently; individual
    /// operations surface failures as [`crate::Error::Backend`].
    pub async fn connect(addr: &str, database: i64) -> Result<Self> {
        let url = format!("redis://{}/{}", addr, database);
        let client = redis::Client::open(url.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!(addr, database, "connected to redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn apply(&self, commands: Vec<Command>) -> Result<()> {
        if commands.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        for command in &commands {
            match command {
                Command::ZSet { key, member, value } => {
                    pipe.zadd(key, member, *value).ignore();
                }
                Command::ZIncr { key, member, delta } => {
                    pipe.zincr(key, member, *delta).ignore();
                }
                Command::SAdd { key, member } => {
                    pipe.sadd(key, member).ignore();
                }
                Command::SRem { key, member } => {
                    pipe.srem(key, member).ignore();
                }
                Command::Expire { key, ttl_secs } => {
                    pipe.expire(key, *ttl_secs).ignore();
                }
            }
        }

        let mut conn = self.conn.clone();
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn sorted_sets(&self, keys: &[String]) -> Result<Vec<Vec<(String, i64)>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("ZRANGE").arg(key).arg(0).arg(-1).arg("WITHSCORES");
        }

        let mut conn = self.conn.clone();
        // Scores arrive as floats; counts written by this crate always fit
        // an i64 exactly.
        let raw: Vec<Vec<(String, f64)>> = pipe.query_async(&mut conn).await?;
        Ok(raw
            .into_iter()
            .map(|pairs| {
                pairs
                    .into_iter()
                    .map(|(member, score)| (member, score as i64))
                    .collect()
            })
            .collect())
    }

    async fn scan_set(&self, key: &str, cursor: u64, count: usize) -> Result<ScanPage> {
        let mut conn = self.conn.clone();
        let (cursor, members): (u64, Vec<String>) = redis::cmd("SSCAN")
            .arg(key)
            .arg(cursor)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;
        Ok(ScanPage { cursor, members })
    }

    async fn scan_keys(&self, pattern: &str, cursor: u64, count: usize) -> Result<ScanPage> {
        let mut conn = self.conn.clone();
        let (cursor, members): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;
        Ok(ScanPage { cursor, members })
    }

    async fn random_members(&self, key: &str, count: usize) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = redis::cmd("SRANDMEMBER")
            .arg(key)
            .arg(count)
            .query_async(&mut conn)
            .await?;
        Ok(members)
    }
}
