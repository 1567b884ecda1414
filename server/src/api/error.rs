use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Structured JSON error body returned by all API error responses.
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Unified application error type.
///
/// Storage problems on the metrics read path never reach this type; the
/// store degrades them to empty results.
#[derive(Debug)]
pub enum AppError {
    /// No route or resource at this path (404).
    NotFound(String),
    /// Internal server error (500).
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(path) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("No resource at {path}"),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };
        (status, Json(ApiErrorBody { code, message })).into_response()
    }
}
