use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scenecat_core::error::CatalogError;
use serde::Serialize;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), details: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let details = err.to_string();
        match err {
            CatalogError::NotFound { .. } => Self::not_found("Not found").with_details(details),
            CatalogError::InvalidRecord { .. } => {
                Self::bad_request("Invalid request").with_details(details)
            }
            CatalogError::QueryTimeout { .. } => {
                tracing::warn!(error = %details, "Discovery query timed out");
                Self::new(StatusCode::GATEWAY_TIMEOUT, "Discovery index not ready")
                    .with_details(details)
            }
            CatalogError::Upstream { .. } => {
                Self::new(StatusCode::BAD_GATEWAY, "Upstream failure").with_details(details)
            }
            _ => {
                tracing::error!(error = %details, "Request failed");
                Self::internal("Internal error").with_details(details)
            }
        }
    }
}
