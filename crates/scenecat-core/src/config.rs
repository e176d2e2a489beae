use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided explicitly by the caller
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

pub const DEFAULT_PREFIX: &str = "scenecat";
pub const DEFAULT_INDEX_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Layered configuration for the catalog index engine
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Namespace for every storage key
    pub prefix: ConfigValue<String>,
    /// Lifetime of a completed derived index
    pub derived_index_ttl: ConfigValue<Duration>,
    /// Delay between readiness probes while a derived index builds
    pub poll_interval: ConfigValue<Duration>,
    /// Upper bound on how long a query waits for a derived index
    pub poll_timeout: ConfigValue<Duration>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl CatalogConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            prefix: ConfigValue::new(DEFAULT_PREFIX.to_string(), ConfigSource::Default),
            derived_index_ttl: ConfigValue::new(DEFAULT_INDEX_TTL, ConfigSource::Default),
            poll_interval: ConfigValue::new(DEFAULT_POLL_INTERVAL, ConfigSource::Default),
            poll_timeout: ConfigValue::new(DEFAULT_POLL_TIMEOUT, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::Config {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_config: FileConfig = toml::from_str(&content).map_err(|e| CatalogError::Config {
            key: "file".to_string(),
            reason: format!("Failed to parse TOML: {}", e),
        })?;

        if let Some(prefix) = file_config.prefix {
            self.prefix.update(validate_prefix(prefix)?, ConfigSource::File);
        }

        if let Some(secs) = file_config.index_ttl_secs {
            self.derived_index_ttl.update(Duration::from_secs(secs), ConfigSource::File);
        }

        if let Some(ms) = file_config.poll_interval_ms {
            self.poll_interval.update(Duration::from_millis(ms), ConfigSource::File);
        }

        if let Some(ms) = file_config.poll_timeout_ms {
            self.poll_timeout.update(Duration::from_millis(ms), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // SCENECAT_PREFIX
        if let Ok(prefix) = env::var("SCENECAT_PREFIX") {
            match validate_prefix(prefix) {
                Ok(prefix) => self.prefix.update(prefix, ConfigSource::Environment),
                Err(e) => tracing::warn!("Ignoring SCENECAT_PREFIX: {}", e),
            }
        }

        // SCENECAT_INDEX_TTL_SECS
        if let Some(secs) = parse_env_u64("SCENECAT_INDEX_TTL_SECS") {
            self.derived_index_ttl.update(Duration::from_secs(secs), ConfigSource::Environment);
        }

        // SCENECAT_POLL_INTERVAL_MS
        if let Some(ms) = parse_env_u64("SCENECAT_POLL_INTERVAL_MS") {
            self.poll_interval.update(Duration::from_millis(ms), ConfigSource::Environment);
        }

        // SCENECAT_POLL_TIMEOUT_MS
        if let Some(ms) = parse_env_u64("SCENECAT_POLL_TIMEOUT_MS") {
            self.poll_timeout.update(Duration::from_millis(ms), ConfigSource::Environment);
        }

        self
    }

    /// Apply explicit overrides
    pub fn update_from_cli(&mut self, overrides: CatalogOverrides) {
        if let Some(prefix) = overrides.prefix {
            self.prefix.update(prefix, ConfigSource::Cli);
        }

        if let Some(ttl) = overrides.derived_index_ttl {
            self.derived_index_ttl.update(ttl, ConfigSource::Cli);
        }

        if let Some(interval) = overrides.poll_interval {
            self.poll_interval.update(interval, ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.poll_timeout {
            self.poll_timeout.update(timeout, ConfigSource::Cli);
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix.value
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("prefix".to_string(), (self.prefix.value.clone(), self.prefix.source));
        map.insert(
            "derived_index_ttl".to_string(),
            (format!("{}s", self.derived_index_ttl.value.as_secs()), self.derived_index_ttl.source),
        );
        map.insert(
            "poll_interval".to_string(),
            (format!("{}ms", self.poll_interval.value.as_millis()), self.poll_interval.source),
        );
        map.insert(
            "poll_timeout".to_string(),
            (format!("{}ms", self.poll_timeout.value.as_millis()), self.poll_timeout.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    prefix: Option<String>,
    index_ttl_secs: Option<u64>,
    poll_interval_ms: Option<u64>,
    poll_timeout_ms: Option<u64>,
}

/// Explicit configuration overrides
#[derive(Debug, Default)]
pub struct CatalogOverrides {
    pub prefix: Option<String>,
    pub derived_index_ttl: Option<Duration>,
    pub poll_interval: Option<Duration>,
    pub poll_timeout: Option<Duration>,
}

pub const DEFAULT_FEED_BASE_URL: &str = "https://api.planet.com/";
pub const DEFAULT_SEED_ENDPOINT: &str = "v0/scenes/landsat/?count=1000";
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_EVENT_TYPE: &str = "scenecat:harvested";

/// Harvester configuration
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Base URL relative endpoints resolve against
    pub base_url: String,
    /// First endpoint of every run
    pub seed_endpoint: String,
    /// Deadline for fetching a single page
    pub page_timeout: Duration,
    /// Notification endpoint; events are disabled when absent
    pub event_url: Option<String>,
    pub event_type: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FEED_BASE_URL.to_string(),
            seed_endpoint: DEFAULT_SEED_ENDPOINT.to_string(),
            page_timeout: DEFAULT_PAGE_TIMEOUT,
            event_url: None,
            event_type: DEFAULT_EVENT_TYPE.to_string(),
        }
    }
}

impl HarvestConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("SCENECAT_FEED_BASE_URL").unwrap_or(defaults.base_url),
            seed_endpoint: env::var("SCENECAT_FEED_SEED").unwrap_or(defaults.seed_endpoint),
            page_timeout: parse_env_u64("SCENECAT_PAGE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.page_timeout),
            event_url: env::var("SCENECAT_EVENT_URL").ok().filter(|u| !u.trim().is_empty()),
            event_type: env::var("SCENECAT_EVENT_TYPE").unwrap_or(defaults.event_type),
        }
    }
}

/// Resolve the feed credential: explicit value first, then `PL_API_KEY`
pub fn resolve_feed_key(explicit: Option<&str>) -> Option<String> {
    explicit
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| env::var("PL_API_KEY").ok().filter(|k| !k.is_empty()))
}

fn validate_prefix(prefix: String) -> Result<String> {
    if prefix.trim().is_empty() || prefix.contains(char::is_whitespace) {
        return Err(CatalogError::Config {
            key: "prefix".to_string(),
            reason: format!("'{}' must be non-empty and contain no whitespace", prefix),
        });
    }
    Ok(prefix)
}

fn parse_env_u64(key: &str) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected a non-negative integer", key, raw);
            None
        }
    }
}
