//! Mapping from the core error taxonomy onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chatlens_core::errors::ChatLensError;
use serde_json::json;

/// Wrapper turning a `ChatLensError` into an HTTP response.
///
/// Transport failures become 503, upstream failures keep the upstream's own
/// status code (passthrough), persistence distinguishes 404 from 400, and
/// everything else is a 500.
pub struct ApiError(pub ChatLensError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            ChatLensError::NotFound(_) => StatusCode::NOT_FOUND,
            ChatLensError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatLensError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            ChatLensError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ChatLensError::Protocol(_)
            | ChatLensError::Config(_)
            | ChatLensError::Io(_)
            | ChatLensError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match &self.0 {
            ChatLensError::Upstream { .. } => "upstream_error",
            ChatLensError::Transport(_) => "transport_error",
            ChatLensError::Protocol(_) => "protocol_error",
            ChatLensError::Config(_) => "config_error",
            ChatLensError::NotFound(_) => "not_found",
            ChatLensError::Validation(_) => "validation_error",
            ChatLensError::Io(_) => "io_error",
            ChatLensError::Internal(_) => "internal_error",
        }
    }
}

impl From<ChatLensError> for ApiError {
    fn from(err: ChatLensError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("request failed: {}", self.0);
        } else {
            log::warn!("request rejected: {}", self.0);
        }

        (
            status,
            Json(json!({
                "error": self.error_type(),
                "details": self.0.to_string(),
                "timestamp": chrono::Utc::now()
            })),
        )
            .into_response()
    }
}
