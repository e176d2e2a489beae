//! Lazily built, constraint-specific indexes over the primary index.
//!
//! A derived index is absent, under construction (exists without the
//! sentinel), or complete (sentinel present, expiry set). Completed indexes
//! are never written again.

use scenecat_core::error::{CatalogError, Result};
use scenecat_core::filter;
use scenecat_core::models::Feature;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::feature_store::FeatureStore;

/// Member marking a derived index as fully built
pub const SENTINEL_MEMBER: &str = "";
/// Score of the sentinel member
pub const SENTINEL_SCORE: f64 = 1.0;

/// Result of an `ensure_built` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The index already existed; nothing was written
    AlreadyPresent,
    Built {
        scanned: usize,
        matched: usize,
        /// Primary entries whose blob was missing or unreadable
        skipped: usize,
    },
}

/// Filter-relevant projection of a constraint
///
/// Only fields the predicate reads take part, band names are sorted, and
/// there are no maps, so equal constraints always serialize identically.
#[derive(Debug, Serialize, PartialEq)]
struct ConstraintKey<'a> {
    cloud_cover: Option<f64>,
    bit_depth: Option<u32>,
    relevance_score: Option<f64>,
    acquired_date: Option<&'a str>,
    bands: Vec<&'a str>,
    bbox: Option<[f64; 4]>,
}

impl<'a> ConstraintKey<'a> {
    fn from_constraint(constraint: &'a Feature) -> Self {
        let mut bands = constraint.bands().map(|b| b.names()).unwrap_or_default();
        bands.sort_unstable();
        bands.dedup();
        Self {
            cloud_cover: constraint.cloud_cover(),
            bit_depth: constraint.bit_depth(),
            relevance_score: constraint.relevance_score(),
            acquired_date: constraint.acquired_date(),
            bands,
            bbox: constraint.bbox.map(|b| [b.min_x, b.min_y, b.max_x, b.max_y]),
        }
    }

    fn is_unconstrained(&self) -> bool {
        self.cloud_cover.is_none()
            && self.bit_depth.is_none()
            && self.relevance_score.is_none()
            && self.acquired_date.is_none()
            && self.bands.is_empty()
            && self.bbox.is_none()
    }
}

/// Canonical text a constraint is hashed from
///
/// An absent constraint and one that sets nothing both encode as `null`.
pub fn canonical_constraint(constraint: Option<&Feature>) -> Result<String> {
    let key = constraint.map(ConstraintKey::from_constraint).filter(|k| !k.is_unconstrained());
    serde_json::to_string(&key).map_err(|e| CatalogError::Serialization(e.to_string()))
}

/// Builds derived indexes by scanning the primary index
#[derive(Clone)]
pub struct DerivedIndexBuilder {
    store: FeatureStore,
    ttl: Duration,
}

impl DerivedIndexBuilder {
    pub fn new(store: FeatureStore, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    /// Deterministic storage key for a constraint's derived index
    pub fn index_name(&self, constraint: Option<&Feature>) -> Result<String> {
        let canonical = canonical_constraint(constraint)?;
        let digest = Sha256::digest(canonical.as_bytes());
        Ok(format!("{}:discover:{}", self.store.prefix(), hex::encode(digest)))
    }

    /// Whether the sentinel has been written to `index`
    pub async fn is_complete(&self, index: &str) -> Result<bool> {
        let at_sentinel_score = self
            .store
            .storage()
            .zrange_by_score(index, SENTINEL_SCORE, SENTINEL_SCORE)
            .await?;
        Ok(at_sentinel_score.iter().any(|m| m == SENTINEL_MEMBER))
    }

    /// Make sure the derived index for `constraint` exists
    ///
    /// The existence check and the scan are not atomic: concurrent first
    /// callers may both scan. Their writes are identical member/score pairs,
    /// so the index converges either way.
    ///
    /// A scan that fails part way removes whatever it wrote, so the next
    /// call starts again from an absent index.
    pub async fn ensure_built(&self, constraint: Option<&Feature>) -> Result<BuildOutcome> {
        let index = self.index_name(constraint)?;
        let storage = self.store.storage();

        if storage.exists(&index).await? {
            return Ok(BuildOutcome::AlreadyPresent);
        }

        tracing::info!(index = %index, "Building derived index");

        let result = self.populate(&index, constraint).await;
        if result.is_err() {
            if let Err(cleanup) = storage.delete(&index).await {
                tracing::warn!(
                    index = %index,
                    error = %cleanup,
                    "Failed to remove partial derived index"
                );
            }
        }
        result
    }

    /// Scan the primary index into `index`, then mark it complete
    async fn populate(&self, index: &str, constraint: Option<&Feature>) -> Result<BuildOutcome> {
        let storage = self.store.storage();
        let entries = self.store.primary_entries().await?;
        let mut matched = 0;
        let mut skipped = 0;

        for (key, score) in &entries {
            let candidate = match self.store.get_by_key(key).await {
                Ok(feature) => feature,
                Err(CatalogError::NotFound { .. }) => {
                    skipped += 1;
                    continue;
                }
                Err(CatalogError::CorruptRecord { key, reason }) => {
                    tracing::warn!(key = %key, reason = %reason, "Skipping unreadable feature");
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if filter::matches(&candidate, constraint) {
                storage.zadd(index, key, *score).await?;
                matched += 1;
            }
        }

        storage.zadd(index, SENTINEL_MEMBER, SENTINEL_SCORE).await?;
        storage.expire(index, self.ttl).await?;

        tracing::info!(
            index = %index,
            scanned = entries.len(),
            matched,
            skipped,
            "Derived index complete"
        );

        Ok(BuildOutcome::Built { scanned: entries.len(), matched, skipped })
    }
}
