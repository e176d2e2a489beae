//! Harvest runs.
//!
//! A run walks the feed from the seed endpoint along each page's `next`
//! link. Every record is transformed, checked against the run's filter and
//! stored with the run's score. The run ends when the feed runs out, when
//! the item cap is reached, or at the first page that cannot be fetched or
//! stored. Features stored before a failure stay in the catalog.

use scenecat_catalog::Catalog;
use scenecat_core::config::{resolve_feed_key, HarvestConfig};
use scenecat_core::error::{CatalogError, Result};
use scenecat_core::filter;
use scenecat_core::models::{Feature, HarvestOptions};
use std::sync::Arc;
use std::time::Duration;

use crate::events::{EventSink, HttpEventSink, NoopEventSink};
use crate::feed::{FeedPage, PlanetFeed, SceneFeed};
use crate::landsat;

/// Why a run ended
#[derive(Debug)]
pub enum StopReason {
    /// The last page had no `next` link
    Exhausted,
    CapReached,
    /// A page could not be fetched, parsed or stored
    Failed(CatalogError),
}

/// Summary of a finished run
#[derive(Debug)]
pub struct HarvestReport {
    /// Features stored by this run
    pub harvested: usize,
    /// Pages fetched successfully
    pub pages: usize,
    /// Primary index size after the run
    pub index_size: u64,
    pub stopped: StopReason,
}

#[derive(Clone)]
pub struct Harvester {
    catalog: Catalog,
    feed: Arc<dyn SceneFeed>,
    events: Arc<dyn EventSink>,
    seed_endpoint: String,
    page_timeout: Duration,
}

impl Harvester {
    pub fn new(
        catalog: Catalog,
        feed: Arc<dyn SceneFeed>,
        events: Arc<dyn EventSink>,
        config: &HarvestConfig,
    ) -> Self {
        Self {
            catalog,
            feed,
            events,
            seed_endpoint: config.seed_endpoint.clone(),
            page_timeout: config.page_timeout,
        }
    }

    /// Harvester over the Planet feed, notifying `event_url` when configured
    pub fn from_config(catalog: Catalog, config: &HarvestConfig) -> Result<Self> {
        let feed = Arc::new(PlanetFeed::new(&config.base_url)?);
        let events: Arc<dyn EventSink> = match &config.event_url {
            Some(url) => Arc::new(HttpEventSink::new(url.clone(), config.event_type.clone())),
            None => Arc::new(NoopEventSink),
        };
        Ok(Self::new(catalog, feed, events, config))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Execute one harvest run
    ///
    /// Page failures end the run and are reported in
    /// [`HarvestReport::stopped`]; only a missing credential or an
    /// unreadable primary index fail the call itself.
    pub async fn run(&self, options: &HarvestOptions) -> Result<HarvestReport> {
        let key = resolve_feed_key(options.planet_key.as_deref()).ok_or_else(|| {
            CatalogError::Config {
                key: "PL_API_KEY".to_string(),
                reason: "no feed credential in the options or the environment".to_string(),
            }
        })?;

        let mut endpoint = Some(self.seed_endpoint.clone());
        let mut harvested = 0;
        let mut pages = 0;

        let stopped = loop {
            let Some(current) = endpoint.take() else {
                break StopReason::Exhausted;
            };

            tracing::info!(endpoint = %current, "Harvesting page");
            let FeedPage { records, next } = match self.fetch(&current, &key).await {
                Ok(page) => page,
                Err(e) => break StopReason::Failed(e),
            };
            pages += 1;

            match self.store_records(records, options, &mut harvested).await {
                Ok(true) => break StopReason::CapReached,
                Ok(false) => endpoint = next,
                Err(e) => break StopReason::Failed(e),
            }
        };

        if let StopReason::Failed(e) = &stopped {
            tracing::error!(error = %e, harvested, "Harvest run stopped early");
        }

        let index_size = self.catalog.index_size().await?;
        tracing::info!(harvested, pages, index_size, "Harvest run finished");

        Ok(HarvestReport { harvested, pages, index_size, stopped })
    }

    async fn fetch(&self, endpoint: &str, key: &str) -> Result<FeedPage> {
        tokio::time::timeout(self.page_timeout, self.feed.fetch_page(endpoint, key))
            .await
            .map_err(|_| {
                CatalogError::upstream(
                    None,
                    format!("{} did not answer within {:?}", endpoint, self.page_timeout),
                )
            })?
    }

    /// Store one page's qualifying records; `Ok(true)` once the cap is hit
    async fn store_records(
        &self,
        records: Vec<serde_json::Value>,
        options: &HarvestOptions,
        harvested: &mut usize,
    ) -> Result<bool> {
        for record in records {
            let feature = match landsat::transform(record) {
                Ok(feature) => feature,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping record");
                    continue;
                }
            };

            if let Some(constraint) = &options.filter {
                let report = filter::explain(&feature, constraint);
                if !report.passed() {
                    tracing::debug!(
                        id = %feature.id,
                        failed = ?report.failures(),
                        "Record rejected by harvest filter"
                    );
                    continue;
                }
            }

            self.catalog.store_feature(&feature, options.reharvest).await?;
            *harvested += 1;

            if options.event {
                self.notify(feature);
            }

            if options.cap_reached(*harvested) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn notify(&self, feature: Feature) {
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Err(e) = events.emit(&feature).await {
                tracing::warn!(id = %feature.id, error = %e, "Failed to issue event");
            }
        });
    }
}
