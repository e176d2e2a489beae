use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use scenecat_core::models::HarvestOptions;
use scenecat_harvest::StopReason;

use crate::dto::HarvestAccepted;
use crate::state::AppState;

/// Start a harvest run in the background (returns 202 Accepted)
pub async fn start_harvest(
    State(state): State<Arc<AppState>>,
    Json(options): Json<HarvestOptions>,
) -> (StatusCode, Json<HarvestAccepted>) {
    tracing::info!(cap = options.cap, event = options.event, "Triggering harvest");

    let harvester = state.harvester.clone();
    tokio::spawn(async move {
        match harvester.run(&options).await {
            Ok(report) => match report.stopped {
                StopReason::Failed(e) => tracing::error!(
                    harvested = report.harvested,
                    error = %e,
                    "Harvest ended with an error"
                ),
                _ => tracing::info!(
                    harvested = report.harvested,
                    index_size = report.index_size,
                    "Harvest completed"
                ),
            },
            Err(e) => tracing::error!(error = %e, "Harvest failed to start"),
        }
    });

    (StatusCode::ACCEPTED, Json(HarvestAccepted::accepted()))
}
