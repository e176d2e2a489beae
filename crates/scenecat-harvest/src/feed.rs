//! Paginated scene feeds

use async_trait::async_trait;
use reqwest::Url;
use scenecat_core::error::{CatalogError, Result};
use serde::Deserialize;

/// One page of raw provider records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    pub records: Vec<serde_json::Value>,
    /// Endpoint of the following page, absent on the last one
    pub next: Option<String>,
}

/// Port for a paginated source of raw scene records
#[async_trait]
pub trait SceneFeed: Send + Sync {
    /// Fetch the page at `endpoint`, authenticating with `key`
    ///
    /// `endpoint` is either absolute or relative to the feed's base URL.
    async fn fetch_page(&self, endpoint: &str, key: &str) -> Result<FeedPage>;
}

/// Planet-style feed over HTTP with Basic authentication
pub struct PlanetFeed {
    base_url: Url,
    client: reqwest::Client,
}

impl PlanetFeed {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| CatalogError::Config {
            key: "base_url".to_string(),
            reason: format!("'{}' is not a valid URL: {}", base_url, e),
        })?;
        Ok(Self { base_url, client: reqwest::Client::new() })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an endpoint
    pub fn resolve(&self, endpoint: &str) -> Result<Url> {
        match Url::parse(endpoint) {
            Ok(url) => Ok(url),
            Err(_) => self.base_url.join(endpoint).map_err(|e| {
                CatalogError::upstream(None, format!("Cannot resolve endpoint '{}': {}", endpoint, e))
            }),
        }
    }
}

#[async_trait]
impl SceneFeed for PlanetFeed {
    async fn fetch_page(&self, endpoint: &str, key: &str) -> Result<FeedPage> {
        let url = self.resolve(endpoint)?;

        let response = self
            .client
            .get(url.clone())
            .basic_auth(key, None::<&str>)
            .send()
            .await
            .map_err(|e| CatalogError::upstream(None, format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::upstream(
                Some(status.as_u16()),
                format!("{} returned {}", url, body),
            ));
        }

        let page: PlanetPage = response.json().await.map_err(|e| {
            CatalogError::upstream(None, format!("Failed to parse page from {}: {}", url, e))
        })?;

        Ok(FeedPage {
            records: page.features,
            next: page.links.and_then(|l| l.next).filter(|n| !n.is_empty()),
        })
    }
}

/// Response envelope of a feed page
#[derive(Debug, Deserialize)]
struct PlanetPage {
    #[serde(default)]
    features: Vec<serde_json::Value>,
    links: Option<PlanetLinks>,
}

#[derive(Debug, Deserialize)]
struct PlanetLinks {
    next: Option<String>,
}
