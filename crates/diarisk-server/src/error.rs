//! Application error types and Axum response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use diarisk_core::ScoreError;

/// Per-request failures surfaced to the client as `{"error": "<message>"}`.
#[derive(Debug)]
pub enum AppError {
    /// No model handle was loaded at startup; persists until restart.
    ModelUnavailable,
    /// Anything else that failed during request processing.
    Internal(String),
}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            AppError::ModelUnavailable => "Model is not loaded".to_string(),
            AppError::Internal(msg) => msg,
        };
        tracing::error!(component = "ml-service", error = %message, "error during prediction");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: message }),
        )
            .into_response()
    }
}
