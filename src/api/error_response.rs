//! HTTP error response handling for the API
//!
//! This module provides conversions from domain errors to HTTP responses
//! with appropriate status codes and JSON error bodies, plus the
//! development-mode gate that suppresses internal error detail in
//! production.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Implement IntoResponse for Error to automatically convert errors to HTTP responses
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

/// Implement IntoResponse for ApiError for explicit error responses
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Default to 500 if we're directly converting an ApiError
        // (usually errors go through Error::into_response which has the status code)
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

/// Build a 5xx response for an internal error.
///
/// Outside development mode the underlying detail is suppressed and the body
/// carries only the generic "Internal server error" message.
pub fn internal_error_response(error: &Error, development: bool) -> Response {
    tracing::error!(error = %error, "internal error while handling request");

    let body = if development {
        ApiError::with_details(
            "Internal server error",
            serde_json::json!({ "error": error.to_string() }),
        )
    } else {
        ApiError::internal()
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
