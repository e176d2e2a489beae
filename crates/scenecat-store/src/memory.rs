//! In-memory storage implementation for development and testing.
//!
//! This implementation uses `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. For production workloads, use the Redis backend.
//!
//! Expiry is measured with `tokio::time::Instant`, so tests running on a
//! paused clock can advance past a key's lifetime.

use async_trait::async_trait;
use scenecat_core::error::{CatalogError, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

use crate::ports::CatalogStorage;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Sorted(HashMap<String, f64>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-memory implementation of CatalogStorage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStorage {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining lifetime of a key, if it has one
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read().unwrap();
        let now = Instant::now();
        entries
            .get(key)
            .filter(|e| e.is_live(now))
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Number of live keys
    pub fn key_count(&self) -> usize {
        let entries = self.entries.read().unwrap();
        let now = Instant::now();
        entries.values().filter(|e| e.is_live(now)).count()
    }

    /// Run `f` against the live sorted set at `key`, or `None` when absent
    fn with_sorted<T>(
        &self,
        key: &str,
        f: impl FnOnce(&HashMap<String, f64>) -> T,
    ) -> Result<Option<T>> {
        let entries = self.entries.read().unwrap();
        match entries.get(key).filter(|e| e.is_live(Instant::now())) {
            None => Ok(None),
            Some(Entry { value: Value::Sorted(set), .. }) => Ok(Some(f(set))),
            Some(_) => Err(wrong_type(key)),
        }
    }

    fn sorted_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<(String, f64)>> {
        Ok(self
            .with_sorted(key, |set| {
                let ordered = ordered_members(set);
                match rank_bounds(ordered.len(), start, stop) {
                    Some((from, to)) => ordered[from..=to].to_vec(),
                    None => Vec::new(),
                }
            })?
            .unwrap_or_default())
    }
}

fn wrong_type(key: &str) -> CatalogError {
    CatalogError::Storage(format!(
        "WRONGTYPE operation against key '{}' holding the wrong kind of value",
        key
    ))
}

fn ordered_members(set: &HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut members: Vec<(String, f64)> = set.iter().map(|(m, s)| (m.clone(), *s)).collect();
    members.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
    members
}

/// Resolve inclusive, possibly negative ranks against a set of `len` members
fn rank_bounds(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[async_trait]
impl CatalogStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap();
        match entries.get(key).filter(|e| e.is_live(Instant::now())) {
            None => Ok(None),
            Some(Entry { value: Value::Str(s), .. }) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            key.to_string(),
            Entry { value: Value::Str(value.to_string()), expires_at: None },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).is_some_and(|e| e.is_live(Instant::now())))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        let now = Instant::now();
        if let Some(entry) = entries.get_mut(key).filter(|e| e.is_live(now)) {
            entry.expires_at = Some(now + ttl);
        }
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        let now = Instant::now();
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
        }
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry { value: Value::Sorted(HashMap::new()), expires_at: None });
        match &mut entry.value {
            Value::Sorted(set) => {
                set.insert(member.to_string(), score);
                Ok(())
            }
            Value::Str(_) => Err(wrong_type(key)),
        }
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        Ok(self.with_sorted(key, |set| set.len() as u64)?.unwrap_or(0))
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>> {
        Ok(self.with_sorted(key, |set| set.get(member).copied())?.flatten())
    }

    async fn zrank(&self, key: &str, member: &str) -> Result<Option<u64>> {
        Ok(self
            .with_sorted(key, |set| {
                ordered_members(set).iter().position(|(m, _)| m == member).map(|r| r as u64)
            })?
            .flatten())
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        Ok(self.sorted_range(key, start, stop)?.into_iter().map(|(m, _)| m).collect())
    }

    async fn zrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(String, f64)>> {
        self.sorted_range(key, start, stop)
    }

    async fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>> {
        Ok(self
            .with_sorted(key, |set| {
                ordered_members(set)
                    .into_iter()
                    .filter(|(_, score)| *score >= min && *score <= max)
                    .map(|(m, _)| m)
                    .collect()
            })?
            .unwrap_or_default())
    }
}
