//! Redis connection configuration
//!
//! Connection parameters come from the platform's `VCAP_SERVICES` binding
//! document. When no usable binding is present the local default
//! `127.0.0.1:6379` is used.

use serde::Deserialize;
use std::env;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl From<ConfigError> for scenecat_core::CatalogError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing(key) => scenecat_core::CatalogError::Config {
                key,
                reason: "missing".to_string(),
            },
            ConfigError::Invalid { key, reason } => {
                scenecat_core::CatalogError::Config { key, reason }
            }
        }
    }
}

/// Redis connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::localhost()
    }
}

impl RedisConfig {
    pub fn localhost() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            password: None,
        }
    }

    /// Resolve configuration from `VCAP_SERVICES`, falling back to localhost
    pub fn from_env() -> Self {
        match env::var("VCAP_SERVICES") {
            Ok(raw) => Self::from_vcap_services(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Unusable VCAP_SERVICES, using {}:{}", DEFAULT_HOST, DEFAULT_PORT);
                Self::localhost()
            }),
            Err(_) => Self::localhost(),
        }
    }

    /// Resolve configuration from `VCAP_SERVICES`, failing when it is absent or malformed
    pub fn from_env_strict() -> Result<Self, ConfigError> {
        let raw = env::var("VCAP_SERVICES")
            .map_err(|_| ConfigError::Missing("VCAP_SERVICES".to_string()))?;
        let services: VcapServices = parse_vcap_services(&raw)?;
        services.redis_config().ok_or_else(|| ConfigError::Invalid {
            key: "VCAP_SERVICES".to_string(),
            reason: "no p-redis binding with a host".to_string(),
        })
    }

    /// Parse a binding document
    ///
    /// A well-formed document without a usable `p-redis` host yields the
    /// localhost default; malformed JSON is an error.
    pub fn from_vcap_services(raw: &str) -> Result<Self, ConfigError> {
        let services = parse_vcap_services(raw)?;
        Ok(services.redis_config().unwrap_or_else(Self::localhost))
    }

    /// Connection URL in `redis://` form
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!("redis://:{}@{}:{}", password, self.host, self.port),
            None => format!("redis://{}:{}", self.host, self.port),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_vcap_services(raw: &str) -> Result<VcapServices, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::Invalid {
        key: "VCAP_SERVICES".to_string(),
        reason: e.to_string(),
    })
}

/// The `VCAP_SERVICES` environment document
#[derive(Debug, Default, Deserialize)]
struct VcapServices {
    #[serde(rename = "p-redis", default)]
    redis: Vec<VcapRedis>,
}

#[derive(Debug, Deserialize)]
struct VcapRedis {
    credentials: VcapCredentials,
}

#[derive(Debug, Default, Deserialize)]
struct VcapCredentials {
    #[serde(default)]
    host: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    port: Option<u16>,
}

impl VcapServices {
    fn redis_config(&self) -> Option<RedisConfig> {
        let credentials = &self.redis.first()?.credentials;
        if credentials.host.is_empty() {
            return None;
        }
        let config = RedisConfig {
            host: credentials.host.clone(),
            port: credentials.port.unwrap_or(DEFAULT_PORT),
            password: Some(credentials.password.clone()).filter(|p| !p.is_empty()),
        };
        tracing::info!(address = %config.address(), "Read Redis binding from environment");
        Some(config)
    }
}
