//! Scenecat Store - Storage port and adapters
//!
//! This crate defines the key/value and sorted-set contract the catalog is
//! written against, and provides an in-memory adapter for development and
//! tests plus a Redis adapter for deployments.

pub mod memory;
pub mod ports;
pub mod redis_store;

pub use memory::MemoryStorage;
pub use ports::CatalogStorage;
pub use redis_store::{RedisConfig, RedisStorage};
