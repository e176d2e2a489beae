use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use scenecat_core::models::Feature;

use crate::dto::{DiscoverParams, PageParams};
use crate::error::ApiError;
use crate::state::AppState;

/// Discover scenes matching query-string constraints
pub async fn discover(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiscoverParams>,
) -> Result<impl IntoResponse, ApiError> {
    let constraint = params.constraint()?;
    let (start, end) = params.range();
    run_discovery(&state, &constraint, start, end).await
}

/// Discover scenes matching a feature-shaped constraint body
pub async fn discover_by_feature(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageParams>,
    Json(constraint): Json<Feature>,
) -> Result<impl IntoResponse, ApiError> {
    let (start, end) = page.range();
    run_discovery(&state, &constraint, start, end).await
}

async fn run_discovery(
    state: &AppState,
    constraint: &Feature,
    start: u64,
    end: u64,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(start, end, "Processing discovery request");

    let (_, body) = state.catalog.discover(Some(constraint), start, end).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}
