use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use scenecat_catalog::band_url;
use scenecat_core::models::Feature;

use crate::error::ApiError;
use crate::state::AppState;

/// Metadata of one catalog entry
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Feature>, ApiError> {
    Ok(Json(state.catalog.get_image(&id).await?))
}

/// Send the client to the location of one band of a scene
pub async fn redirect_to_band(
    State(state): State<Arc<AppState>>,
    Path((id, band)): Path<(String, String)>,
) -> Result<Redirect, ApiError> {
    let feature = state.catalog.get_image(&id).await?;
    let url = band_url(&feature, &band)?;

    tracing::debug!(id = %id, band = %band, url = %url, "Redirecting to band");
    Ok(Redirect::temporary(url))
}
