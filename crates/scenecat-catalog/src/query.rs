//! Discovery queries over derived indexes.
//!
//! A query kicks off the derived index build in the background, then polls
//! the index until the requested page is certainly available: either the
//! index already holds more than `end` members, or the sentinel shows the
//! build has finished. Pages past the final size of an index still under
//! construction read as empty until it completes.

use scenecat_core::config::CatalogConfig;
use scenecat_core::error::{CatalogError, Result};
use scenecat_core::models::{Feature, ImageDescriptors};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::derived::{BuildOutcome, DerivedIndexBuilder, SENTINEL_MEMBER};
use crate::feature_store::FeatureStore;

/// Read path of the catalog
///
/// Within one process, builds for the same index name are collapsed: while a
/// build task is running, further queries for that name only poll.
#[derive(Clone)]
pub struct QueryEngine {
    builder: DerivedIndexBuilder,
    poll_interval: Duration,
    poll_timeout: Duration,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Removes an index name from the in-flight set when the build task ends
struct InFlightGuard {
    name: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut names) = self.in_flight.lock() {
            names.remove(&self.name);
        }
    }
}

impl QueryEngine {
    pub fn new(store: FeatureStore, config: &CatalogConfig) -> Self {
        Self {
            builder: DerivedIndexBuilder::new(store, config.derived_index_ttl.value),
            poll_interval: config.poll_interval.value,
            poll_timeout: config.poll_timeout.value,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn builder(&self) -> &DerivedIndexBuilder {
        &self.builder
    }

    pub fn store(&self) -> &FeatureStore {
        self.builder.store()
    }

    /// Start building the derived index for `constraint` in a background task
    ///
    /// Returns `None` when this process is already building that index. The
    /// task logs its own failure; its result is also available through the
    /// returned handle.
    pub fn spawn_build(
        &self,
        constraint: Option<Feature>,
    ) -> Result<Option<JoinHandle<Result<BuildOutcome>>>> {
        let name = self.builder.index_name(constraint.as_ref())?;
        {
            let mut names = self
                .in_flight
                .lock()
                .map_err(|_| CatalogError::Storage("in-flight build registry poisoned".to_string()))?;
            if !names.insert(name.clone()) {
                tracing::debug!(index = %name, "Build already in flight");
                return Ok(None);
            }
        }

        let guard = InFlightGuard { name, in_flight: self.in_flight.clone() };
        let builder = self.builder.clone();
        Ok(Some(tokio::spawn(async move {
            let result = builder.ensure_built(constraint.as_ref()).await;
            if let Err(e) = &result {
                tracing::error!(index = %guard.name, error = %e, "Derived index build aborted");
            }
            drop(guard);
            result
        })))
    }

    /// Fetch ranks `start..=end` of the features matching `constraint`
    ///
    /// Returns the structured result together with its JSON document.
    pub async fn query(
        &self,
        constraint: Option<&Feature>,
        start: u64,
        end: u64,
    ) -> Result<(ImageDescriptors, String)> {
        let index = self.builder.index_name(constraint)?;
        let build = self.spawn_build(constraint.cloned())?;

        self.wait_until_ready(&index, end, build).await?;

        let features = self.read_page(&index, start, end).await?;
        let descriptors = ImageDescriptors::new(start, features);
        let text = serde_json::to_string(&descriptors)
            .map_err(|e| CatalogError::Serialization(e.to_string()))?;

        tracing::info!(index = %index, start, end, count = descriptors.count, "Discovery query served");
        Ok((descriptors, text))
    }

    /// Poll until `index` can serve rank `end` or is complete
    async fn wait_until_ready(
        &self,
        index: &str,
        end: u64,
        mut build: Option<JoinHandle<Result<BuildOutcome>>>,
    ) -> Result<()> {
        let storage = self.store().storage();
        let started = Instant::now();

        loop {
            if storage.zcard(index).await? > end {
                return Ok(());
            }
            if self.builder.is_complete(index).await? {
                return Ok(());
            }

            if let Some(handle) = build.take_if(|h| h.is_finished()) {
                match handle.await {
                    Ok(Err(e)) => return Err(e),
                    Err(e) => return Err(CatalogError::Storage(format!("build task failed: {}", e))),
                    // Finished cleanly, the next probe sees the sentinel
                    Ok(Ok(_)) => continue,
                }
            }

            let waited = started.elapsed();
            if waited >= self.poll_timeout {
                return Err(CatalogError::QueryTimeout { index: index.to_string(), waited });
            }

            tracing::debug!(index = %index, end, "Derived index not ready");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Read and hydrate one page, skipping the sentinel and vanished blobs
    async fn read_page(&self, index: &str, start: u64, end: u64) -> Result<Vec<Feature>> {
        if start > end {
            return Ok(Vec::new());
        }
        let storage = self.store().storage();

        // The sentinel holds a rank of its own; shift the window past it.
        let (from, to) = match storage.zrank(index, SENTINEL_MEMBER).await? {
            Some(rank) if rank <= start => (start.saturating_add(1), end.saturating_add(1)),
            Some(rank) if rank <= end => (start, end.saturating_add(1)),
            _ => (start, end),
        };

        let members = storage.zrange(index, storage_rank(from), storage_rank(to)).await?;
        let mut features = Vec::with_capacity(members.len());

        for key in members.iter().filter(|m| m.as_str() != SENTINEL_MEMBER) {
            match self.store().get_by_key(key).await {
                Ok(feature) => features.push(feature),
                Err(CatalogError::NotFound { .. }) => continue,
                Err(CatalogError::CorruptRecord { key, reason }) => {
                    tracing::warn!(key = %key, reason = %reason, "Skipping unreadable feature");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(features)
    }
}

/// Storage rank for a page bound; bounds past `i64::MAX` read as the tail
fn storage_rank(rank: u64) -> i64 {
    i64::try_from(rank).unwrap_or(i64::MAX)
}
