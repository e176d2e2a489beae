use scenecat_core::error::{CatalogError, Result};
use scenecat_core::models::Feature;
use scenecat_store::CatalogStorage;
use std::sync::Arc;

/// Identity storage for catalog entries plus the primary index
///
/// Feature blobs live at `prefix:identity`; the primary index is the sorted
/// set at the bare prefix, scored by harvest order.
#[derive(Clone)]
pub struct FeatureStore {
    storage: Arc<dyn CatalogStorage>,
    prefix: String,
}

impl FeatureStore {
    pub fn new(storage: Arc<dyn CatalogStorage>, prefix: impl Into<String>) -> Self {
        Self { storage, prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of the primary index
    pub fn primary_index(&self) -> &str {
        &self.prefix
    }

    pub fn storage(&self) -> &Arc<dyn CatalogStorage> {
        &self.storage
    }

    /// Storage key for a feature identity
    pub fn key_for(&self, id: &str) -> String {
        format!("{}:{}", self.prefix, id)
    }

    /// Persist a feature and rank it in the primary index
    ///
    /// The blob is written before the index entry, so every indexed key has a
    /// blob. A failure between the two writes leaves an unindexed blob that
    /// the next store of the same identity repairs.
    pub async fn store(&self, feature: &Feature, score: f64) -> Result<String> {
        if feature.id.is_empty() {
            return Err(CatalogError::InvalidRecord {
                id: String::new(),
                reason: "feature has no identity".to_string(),
            });
        }

        let blob = serde_json::to_string(feature)
            .map_err(|e| CatalogError::Serialization(format!("Failed to serialize {}: {}", feature.id, e)))?;
        let key = self.key_for(&feature.id);

        self.storage.set(&key, &blob).await?;
        self.storage.zadd(self.primary_index(), &key, score).await?;

        tracing::debug!(key = %key, score, "Stored feature");
        Ok(key)
    }

    /// Fetch a feature by identity
    pub async fn get(&self, id: &str) -> Result<Feature> {
        self.get_by_key(&self.key_for(id)).await
    }

    /// Fetch a feature by storage key
    pub async fn get_by_key(&self, key: &str) -> Result<Feature> {
        let blob = self.storage.get(key).await?.ok_or_else(|| CatalogError::not_found(key))?;
        serde_json::from_str(&blob).map_err(|e| CatalogError::CorruptRecord {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// Cardinality of the primary index
    pub async fn size(&self) -> Result<u64> {
        self.storage.zcard(self.primary_index()).await
    }

    /// Score of a key in the primary index
    pub async fn score(&self, key: &str) -> Result<Option<f64>> {
        self.storage.zscore(self.primary_index(), key).await
    }

    /// Every primary index entry in ascending score order
    pub async fn primary_entries(&self) -> Result<Vec<(String, f64)>> {
        self.storage.zrange_with_scores(self.primary_index(), 0, -1).await
    }

    /// Remove the primary index
    ///
    /// Feature blobs are left in place and become reachable again once a
    /// later harvest re-indexes them.
    pub async fn drop_index(&self) -> Result<()> {
        tracing::info!(index = %self.prefix, "Dropping primary index");
        self.storage.delete(self.primary_index()).await
    }
}

/// URL of a named band of a scene
pub fn band_url<'a>(feature: &'a Feature, band: &str) -> Result<&'a str> {
    feature.bands().and_then(|bands| bands.url(band)).ok_or_else(|| CatalogError::NotFound {
        key: format!("band \"{}\" of image {}", band, feature.id),
    })
}
