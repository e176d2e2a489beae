use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Discovery
        .route("/discover", get(handlers::discover).post(handlers::discover_by_feature))

        // Images
        .route("/images/{id}", get(handlers::get_image))
        .route("/images/{id}/bands/{band}", get(handlers::redirect_to_band))

        // Primary index administration
        .route("/index", delete(handlers::drop_index))
        .route("/index/size", get(handlers::index_size))

        // Harvesting
        .route("/harvest", post(handlers::start_harvest))

        .with_state(state)
}
