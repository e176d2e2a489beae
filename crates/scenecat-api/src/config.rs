use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the catalog keeps its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Redis,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{}', expected redis or memory", other)),
        }
    }
}

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: Option<String>,
    pub storage: StorageBackend,
    /// Optional TOML file layered under the catalog's environment settings
    pub config_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 8080, cors_origin: None, storage: StorageBackend::default(), config_file: None }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("SCENECAT_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(defaults.port);

        let cors_origin = env::var("SCENECAT_CORS_ORIGIN").ok().filter(|o| !o.is_empty());

        let storage = match env::var("SCENECAT_STORAGE") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring SCENECAT_STORAGE: {}", e);
                defaults.storage
            }),
            Err(_) => defaults.storage,
        };

        let config_file = env::var("SCENECAT_CONFIG").ok().map(PathBuf::from);

        Self { port, cors_origin, storage, config_file }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
