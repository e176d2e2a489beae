use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::dto::IndexSizeResponse;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn index_size(
    State(state): State<Arc<AppState>>,
) -> Result<Json<IndexSizeResponse>, ApiError> {
    let size = state.catalog.index_size().await?;
    Ok(Json(IndexSizeResponse { size }))
}

/// Drop the primary index; stored features stay readable by identity
pub async fn drop_index(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    tracing::info!("Dropping primary index");
    state.catalog.drop_index().await?;
    Ok(StatusCode::NO_CONTENT)
}
