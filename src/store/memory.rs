//! In-process store
//!
//! Implements [`Store`] over plain collections with the Redis semantics
//! the engine relies on: sets disappear when their last member is removed,
//! sorted-set reads are ordered by score then member, and scans page
//! through a cursor. Used by the test suites and for embedded runs that
//! do not need persistence.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use crate::error::Result;
use crate::store::{Command, ScanPage, Store};

#[derive(Debug, Default)]
struct State {
    zsets: HashMap<String, BTreeMap<String, i64>>,
    sets: HashMap<String, BTreeSet<String>>,
    ttls: HashMap<String, i64>,
}

impl State {
    fn key_exists(&self, key: &str) -> bool {
        self.zsets.contains_key(key) || self.sets.contains_key(key)
    }
}

/// In-memory [`Store`] implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All keys currently present, sorted
    pub fn keys(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut keys: BTreeSet<String> = state.zsets.keys().cloned().collect();
        keys.extend(state.sets.keys().cloned());
        keys.into_iter().collect()
    }

    /// Members of the unordered set at `key`, sorted
    pub fn set_members(&self, key: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// `(member, score)` pairs of the sorted set at `key`, ordered by
    /// score then member
    pub fn sorted_set(&self, key: &str) -> Vec<(String, i64)> {
        let state = self.state.lock().unwrap();
        state
            .zsets
            .get(key)
            .map(|zset| sorted_pairs(zset))
            .unwrap_or_default()
    }

    /// The TTL recorded for `key`, if any
    pub fn ttl(&self, key: &str) -> Option<i64> {
        self.state.lock().unwrap().ttls.get(key).copied()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn apply(&self, commands: Vec<Command>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for command in commands {
            match command {
                Command::ZSet { key, member, value } => {
                    state.zsets.entry(key).or_default().insert(member, value);
                }
                Command::ZIncr { key, member, delta } => {
                    *state
                        .zsets
                        .entry(key)
                        .or_default()
                        .entry(member)
                        .or_insert(0) += delta;
                }
                Command::SAdd { key, member } => {
                    state.sets.entry(key).or_default().insert(member);
                }
                Command::SRem { key, member } => {
                    if let Some(set) = state.sets.get_mut(&key) {
                        set.remove(&member);
                        if set.is_empty() {
                            state.sets.remove(&key);
                            state.ttls.remove(&key);
                        }
                    }
                }
                Command::Expire { key, ttl_secs } => {
                    if state.key_exists(&key) {
                        state.ttls.insert(key, ttl_secs);
                    }
                }
            }
        }
        Ok(())
    }

    async fn sorted_sets(&self, keys: &[String]) -> Result<Vec<Vec<(String, i64)>>> {
        let state = self.state.lock().unwrap();
        Ok(keys
            .iter()
            .map(|key| {
                state
                    .zsets
                    .get(key)
                    .map(|zset| sorted_pairs(zset))
                    .unwrap_or_default()
            })
            .collect())
    }

    async fn scan_set(&self, key: &str, cursor: u64, count: usize) -> Result<ScanPage> {
        let members = self.set_members(key);
        Ok(page(members, cursor, count))
    }

    async fn scan_keys(&self, pattern: &str, cursor: u64, count: usize) -> Result<ScanPage> {
        let matches: Vec<String> = self
            .keys()
            .into_iter()
            .filter(|key| glob_match(pattern.as_bytes(), key.as_bytes()))
            .collect();
        Ok(page(matches, cursor, count))
    }

    async fn random_members(&self, key: &str, count: usize) -> Result<Vec<String>> {
        let mut members = self.set_members(key);
        members.truncate(count);
        Ok(members)
    }
}

fn sorted_pairs(zset: &BTreeMap<String, i64>) -> Vec<(String, i64)> {
    let mut pairs: Vec<(String, i64)> = zset
        .iter()
        .map(|(member, score)| (member.clone(), *score))
        .collect();
    pairs.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}

/// Slice one page out of a stable member listing, using the cursor as a
/// plain offset. A zero cursor in the result ends the iteration.
fn page(members: Vec<String>, cursor: u64, count: usize) -> ScanPage {
    let start = (cursor as usize).min(members.len());
    let end = (start + count).min(members.len());
    ScanPage {
        cursor: if end == members.len() { 0 } else { end as u64 },
        members: members[start..end].to_vec(),
    }
}

/// Minimal Redis-style glob: `*`, `?` and `[abc]` character classes.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some(b'*') => {
            glob_match(&pattern[1..], text) || (!text.is_empty() && glob_match(pattern, &text[1..]))
        }
        Some(b'?') => !text.is_empty() && glob_match(&pattern[1..], &text[1..]),
        Some(b'[') => match pattern.iter().position(|&b| b == b']') {
            Some(end) => {
                let class = &pattern[1..end];
                match text.first() {
                    Some(c) if class.contains(c) => glob_match(&pattern[end + 1..], &text[1..]),
                    _ => false,
                }
            }
            None => false,
        },
        Some(&c) => text.first() == Some(&c) && glob_match(&pattern[1..], &text[1..]),
    }
}
