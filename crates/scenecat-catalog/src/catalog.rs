use scenecat_core::config::CatalogConfig;
use scenecat_core::error::Result;
use scenecat_core::models::{Feature, ImageDescriptors};
use scenecat_store::CatalogStorage;
use std::sync::Arc;

use crate::feature_store::FeatureStore;
use crate::query::QueryEngine;

/// Write and read paths of one catalog, sharing a storage client
#[derive(Clone)]
pub struct Catalog {
    store: FeatureStore,
    engine: QueryEngine,
}

impl Catalog {
    pub fn new(storage: Arc<dyn CatalogStorage>, config: &CatalogConfig) -> Self {
        let store = FeatureStore::new(storage, config.prefix());
        let engine = QueryEngine::new(store.clone(), config);
        Self { store, engine }
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    pub async fn store_feature(&self, feature: &Feature, score: f64) -> Result<String> {
        self.store.store(feature, score).await
    }

    pub async fn get_image(&self, id: &str) -> Result<Feature> {
        self.store.get(id).await
    }

    pub async fn index_size(&self) -> Result<u64> {
        self.store.size().await
    }

    pub async fn drop_index(&self) -> Result<()> {
        self.store.drop_index().await
    }

    pub async fn discover(
        &self,
        constraint: Option<&Feature>,
        start: u64,
        end: u64,
    ) -> Result<(ImageDescriptors, String)> {
        self.engine.query(constraint, start, end).await
    }
}
