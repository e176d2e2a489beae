//! Notifications for harvested features

use async_trait::async_trait;
use scenecat_core::error::{CatalogError, Result};
use scenecat_core::models::Feature;
use serde::Serialize;

/// Port for announcing newly stored features
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, feature: &Feature) -> Result<()>;
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn emit(&self, _feature: &Feature) -> Result<()> {
        Ok(())
    }
}

/// Sink that POSTs each event as JSON to a fixed URL
pub struct HttpEventSink {
    url: String,
    event_type: String,
    client: reqwest::Client,
}

impl HttpEventSink {
    pub fn new(url: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self { url: url.into(), event_type: event_type.into(), client: reqwest::Client::new() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Event body
#[derive(Debug, Serialize)]
struct HarvestEvent<'a> {
    #[serde(rename = "type")]
    event_type: &'a str,
    data: &'a Feature,
}

#[async_trait]
impl EventSink for HttpEventSink {
    async fn emit(&self, feature: &Feature) -> Result<()> {
        let event = HarvestEvent { event_type: &self.event_type, data: feature };

        let response = self
            .client
            .post(&self.url)
            .json(&event)
            .send()
            .await
            .map_err(|e| CatalogError::upstream(None, format!("Failed to send event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::upstream(
                Some(status.as_u16()),
                format!("Event endpoint rejected {}: {}", feature.id, body),
            ));
        }

        Ok(())
    }
}
