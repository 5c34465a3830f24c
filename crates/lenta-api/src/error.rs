//! HTTP error response conversion.
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; `AppError`
//! values convert via `?` and render as a consistent JSON body. Internal
//! details (database text, stack state) never reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lenta_core::AppError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling.
    pub code: &'static str,
}

/// Wrapper so `IntoResponse` (axum trait) can be implemented for `AppError`
/// (lenta-core type) despite orphan rules.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

fn status_and_code(err: &AppError) -> (StatusCode, &'static str) {
    match err {
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        AppError::Queue(_) => (StatusCode::INTERNAL_SERVER_ERROR, "QUEUE_ERROR"),
        AppError::ImageProcessing(_) => (StatusCode::BAD_REQUEST, "IMAGE_ERROR"),
        AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let (status, code) = status_and_code(&self.0);

        if status.is_server_error() {
            tracing::error!(error = %self.0, code, "request failed");
        } else {
            tracing::debug!(error = %self.0, code, "request rejected");
        }

        let body = ErrorResponse {
            error: self.0.client_message(),
            code,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let (status, code) = status_and_code(&AppError::NotFound("task does not exist".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn invalid_input_maps_to_400() {
        let (status, _) = status_and_code(&AppError::InvalidInput("incorrectly marked users".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn queue_and_storage_failures_are_500s() {
        let (status, _) = status_and_code(&AppError::Queue("redis down".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let (status, _) = status_and_code(&AppError::Storage("disk full".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
