//! Scenecat Catalog - Feature store, derived indexes, and discovery queries
//!
//! Features live as serialized blobs under `prefix:identity`, ranked in a
//! primary sorted set stored at the bare prefix. Each distinct query shape gets
//! a derived sorted set that is built lazily on first use, marked complete
//! with a sentinel member and expired after a fixed lifetime.

pub mod catalog;
pub mod derived;
pub mod feature_store;
pub mod query;

pub use catalog::Catalog;
pub use derived::{BuildOutcome, DerivedIndexBuilder, SENTINEL_MEMBER, SENTINEL_SCORE};
pub use feature_store::{band_url, FeatureStore};
pub use query::QueryEngine;
