use async_trait::async_trait;
use scenecat_core::error::Result;
use std::time::Duration;

/// Port for the catalog's backing store
///
/// Mirrors a Redis-style data model: plain string values plus ordered sets
/// of members with `f64` scores, both subject to per-key expiry. Sorted-set
/// members are ordered by score, then lexicographically by member. Rank
/// arguments are inclusive and may be negative to count from the end.
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    /// Read a string value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a string value, clearing any expiry on the key
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key of any type
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check whether a key of any type exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Expire a key after the given duration
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Insert a member or update its score
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()>;

    /// Number of members in a sorted set (0 when absent)
    async fn zcard(&self, key: &str) -> Result<u64>;

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>>;

    /// Zero-based rank of a member in ascending order
    async fn zrank(&self, key: &str, member: &str) -> Result<Option<u64>>;

    /// Members between two ranks
    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    /// Members and scores between two ranks
    async fn zrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(String, f64)>>;

    /// Members whose score lies in `[min, max]`
    async fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>>;
}
