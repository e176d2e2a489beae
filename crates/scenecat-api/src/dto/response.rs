use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok", service: "scenecat-api" }
    }
}

/// Primary index size
#[derive(Debug, Serialize)]
pub struct IndexSizeResponse {
    pub size: u64,
}

/// Harvest trigger response
#[derive(Debug, Serialize)]
pub struct HarvestAccepted {
    pub status: String,
    pub message: String,
}

impl HarvestAccepted {
    pub fn accepted() -> Self {
        Self {
            status: "accepted".to_string(),
            message: "Harvest started. Poll GET /index/size for progress.".to_string(),
        }
    }
}
