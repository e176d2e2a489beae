use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use scenecat_catalog::Catalog;
use scenecat_core::config::{CatalogConfig, HarvestConfig};
use scenecat_harvest::Harvester;
use scenecat_store::{CatalogStorage, MemoryStorage, RedisConfig, RedisStorage};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scenecat_api::{create_router, ApiConfig, AppState, StorageBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "scenecat_api=info,scenecat_catalog=info,scenecat_harvest=info,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();

    let mut catalog_config = CatalogConfig::with_defaults();
    if let Some(path) = &config.config_file {
        catalog_config = catalog_config
            .load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    }
    let catalog_config = catalog_config.load_from_env();
    for (key, (value, source)) in catalog_config.to_inspection_map() {
        tracing::debug!(key = %key, value = %value, source = ?source, "Catalog setting");
    }

    tracing::info!(
        port = config.port,
        prefix = %catalog_config.prefix(),
        storage = ?config.storage,
        "Starting scenecat API server"
    );

    let storage: Arc<dyn CatalogStorage> = match config.storage {
        StorageBackend::Redis => {
            let redis = RedisConfig::from_env();
            tracing::info!(address = %redis.address(), "Connecting to Redis");
            let store = RedisStorage::connect(&redis)
                .await
                .with_context(|| format!("Failed to connect to Redis at {}", redis.address()))?;
            Arc::new(store)
        }
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage (set SCENECAT_STORAGE=redis for Redis)");
            Arc::new(MemoryStorage::new())
        }
    };

    let catalog = Catalog::new(storage, &catalog_config);
    let harvester = Harvester::from_config(catalog.clone(), &HarvestConfig::from_env())
        .context("Invalid harvest configuration")?;
    let state = Arc::new(AppState::new(catalog, harvester));

    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new().allow_origin(
            origin.parse::<HeaderValue>().with_context(|| format!("Invalid CORS origin {}", origin))?,
        ),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = create_router(state).layer(cors).layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
