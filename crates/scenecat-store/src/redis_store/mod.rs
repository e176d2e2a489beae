//! Redis storage adapter

mod config;

pub use config::{ConfigError, RedisConfig};

use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, RedisError};
use async_trait::async_trait;
use scenecat_core::error::{CatalogError, Result};
use std::time::Duration;

use crate::ports::CatalogStorage;

/// Redis implementation of CatalogStorage
///
/// Holds one multiplexed connection; clones share it.
#[derive(Clone)]
pub struct RedisStorage {
    conn: MultiplexedConnection,
}

impl RedisStorage {
    /// Connect using the given configuration
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = ::redis::Client::open(config.url()).map_err(storage_error)?;
        let conn = client.get_multiplexed_async_connection().await.map_err(storage_error)?;
        tracing::info!(address = %config.address(), "Connected to Redis");
        Ok(Self { conn })
    }

    /// Connect using the environment's service binding
    pub async fn from_env() -> Result<Self> {
        Self::connect(&RedisConfig::from_env()).await
    }

    fn conn(&self) -> MultiplexedConnection {
        self.conn.clone()
    }
}

fn storage_error(err: RedisError) -> CatalogError {
    CatalogError::Storage(err.to_string())
}

#[async_trait]
impl CatalogStorage for RedisStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self.conn().get(key).await.map_err(storage_error)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _: () = self.conn().set(key, value).await.map_err(storage_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let _: () = self.conn().del(key).await.map_err(storage_error)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let exists: bool = self.conn().exists(key).await.map_err(storage_error)?;
        Ok(exists)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn();
        let _: () = ::redis::cmd("PEXPIRE")
            .arg(key)
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        let _: () = self.conn().zadd(key, member, score).await.map_err(storage_error)?;
        Ok(())
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        let count: u64 = self.conn().zcard(key).await.map_err(storage_error)?;
        Ok(count)
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>> {
        let score: Option<f64> = self.conn().zscore(key, member).await.map_err(storage_error)?;
        Ok(score)
    }

    async fn zrank(&self, key: &str, member: &str) -> Result<Option<u64>> {
        let rank: Option<u64> = self.conn().zrank(key, member).await.map_err(storage_error)?;
        Ok(rank)
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let members: Vec<String> = self
            .conn()
            .zrange(key, start as isize, stop as isize)
            .await
            .map_err(storage_error)?;
        Ok(members)
    }

    async fn zrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(String, f64)>> {
        let members: Vec<(String, f64)> = self
            .conn()
            .zrange_withscores(key, start as isize, stop as isize)
            .await
            .map_err(storage_error)?;
        Ok(members)
    }

    async fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>> {
        let members: Vec<String> =
            self.conn().zrangebyscore(key, min, max).await.map_err(storage_error)?;
        Ok(members)
    }
}
