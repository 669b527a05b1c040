//! System handlers: liveness, OpenAPI, 404 fallback.

use axum::{
    Json,
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;

use crate::error::ApiError;

/// GET /health-check - Liveness check (no upstream contact)
#[utoipa::path(
    get,
    path = "/health-check",
    tag = "system",
    responses(
        (status = 200, description = "Service is running")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "message": "API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/api/v1/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}

/// Fallback handler for unmatched routes
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(format!("Route {method} {uri} not found"))),
    )
}
