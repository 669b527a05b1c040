//! Resolution endpoint handlers.
//!
//! The method decides the failure status for terminal resolution errors:
//! POST/PUT answer 400, GET/PATCH answer 404 — matching the semantics of
//! "create failed" versus "nothing found for this query".

use super::{DownloadQuery, DownloadRequest, PatchRequest};
use crate::api::AppState;
use crate::api::error_response::internal_error_response;
use crate::error::{ApiError, Error, ToHttpStatus};
use crate::validation::{REQUIRED_MESSAGE, validate_pin_url};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

/// Map a resolution failure to a response, using `failure_status` for
/// client-visible terminal errors and the suppressing 500 path for anything
/// internal.
fn resolution_failure(state: &AppState, failure_status: StatusCode, error: Error) -> Response {
    if error.status_code() >= 500 {
        return internal_error_response(&error, state.config.server.api.development);
    }
    tracing::warn!(error = %error, "resolution failed");
    (failure_status, Json(ApiError::new(error.to_string()))).into_response()
}

fn validation_failure(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::validation(vec![message])),
    )
        .into_response()
}

/// Pull the URL out of a request body, rejecting absent or non-Pinterest URLs
fn require_valid_url(url: Option<String>) -> Result<String, Response> {
    let Some(url) = url else {
        return Err(validation_failure(REQUIRED_MESSAGE.to_string()));
    };
    if let Err(error) = validate_pin_url(&url) {
        return Err(validation_failure(error.to_string()));
    }
    Ok(url)
}

/// POST /download - Resolve a pin URL into downloadable media
#[utoipa::path(
    post,
    path = "/api/v1/download",
    tag = "download",
    request_body = DownloadRequest,
    responses(
        (status = 201, description = "Resolution succeeded", body = crate::types::Resolution),
        (status = 400, description = "Validation or resolution failure", body = crate::error::ApiError),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_download(
    State(state): State<AppState>,
    Json(body): Json<DownloadRequest>,
) -> Response {
    let url = match require_valid_url(body.url) {
        Ok(url) => url,
        Err(response) => return response,
    };

    tracing::info!(url = %url, "POST download request");

    match state.resolver.resolve(&url).await {
        Ok(resolution) => {
            tracing::info!(
                url = %url,
                kind = %resolution.kind,
                url_count = resolution.urls.len(),
                "download request succeeded"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "status": "success",
                    "message": "Download request created successfully",
                    "data": resolution,
                    "timestamp": Utc::now(),
                })),
            )
                .into_response()
        }
        Err(error) => resolution_failure(&state, StatusCode::BAD_REQUEST, error),
    }
}

/// GET /download?url=... - Retrieve download info for a pin URL
#[utoipa::path(
    get,
    path = "/api/v1/download",
    tag = "download",
    params(
        ("url" = String, Query, description = "Pinterest pin URL to resolve")
    ),
    responses(
        (status = 200, description = "Resolution succeeded", body = crate::types::Resolution),
        (status = 400, description = "Missing url parameter", body = crate::error::ApiError),
        (status = 404, description = "Resolution failure", body = crate::error::ApiError)
    )
)]
pub async fn get_download_info(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let Some(url) = query.url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("URL query parameter is required")),
        )
            .into_response();
    };

    tracing::info!(url = %url, "GET download info");

    match state.resolver.resolve(&url).await {
        Ok(resolution) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": resolution,
                "timestamp": Utc::now(),
            })),
        )
            .into_response(),
        Err(error) => resolution_failure(&state, StatusCode::NOT_FOUND, error),
    }
}

/// PUT /download - Re-resolve with forced session invalidation
#[utoipa::path(
    put,
    path = "/api/v1/download",
    tag = "download",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Resolution succeeded", body = crate::types::Resolution),
        (status = 400, description = "Validation or resolution failure", body = crate::error::ApiError)
    )
)]
pub async fn update_download(
    State(state): State<AppState>,
    Json(body): Json<DownloadRequest>,
) -> Response {
    let url = match require_valid_url(body.url) {
        Ok(url) => url,
        Err(response) => return response,
    };

    tracing::info!(url = %url, "PUT update request, invalidating session");

    // Force a fresh session before resolving
    state.resolver.invalidate_session().await;

    match state.resolver.resolve(&url).await {
        Ok(resolution) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Download request updated successfully",
                "data": resolution,
                "timestamp": Utc::now(),
            })),
        )
            .into_response(),
        Err(error) => resolution_failure(&state, StatusCode::BAD_REQUEST, error),
    }
}

/// PATCH /download - Resolve and return a filtered subset of the result
#[utoipa::path(
    patch,
    path = "/api/v1/download",
    tag = "download",
    request_body = PatchRequest,
    responses(
        (status = 200, description = "Filtered resolution result"),
        (status = 400, description = "Missing url", body = crate::error::ApiError),
        (status = 404, description = "Resolution failure", body = crate::error::ApiError)
    )
)]
pub async fn patch_download(
    State(state): State<AppState>,
    Json(body): Json<PatchRequest>,
) -> Response {
    let Some(url) = body.url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("URL is required")),
        )
            .into_response();
    };

    tracing::info!(
        url = %url,
        metadata_only = body.options.metadata_only,
        urls_only = body.options.urls_only,
        "PATCH request"
    );

    let resolution = match state.resolver.resolve(&url).await {
        Ok(resolution) => resolution,
        Err(error) => return resolution_failure(&state, StatusCode::NOT_FOUND, error),
    };

    if body.options.metadata_only {
        return (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": {
                    "metadata": resolution.metadata,
                    "type": resolution.kind,
                    "timestamp": Utc::now(),
                },
            })),
        )
            .into_response();
    }

    if body.options.urls_only {
        return (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": {
                    "urls": resolution.urls,
                    "timestamp": Utc::now(),
                },
            })),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": "Partial update successful",
            "data": resolution,
            "timestamp": Utc::now(),
        })),
    )
        .into_response()
}

/// GET /download/health - Probe upstream reachability
#[utoipa::path(
    get,
    path = "/api/v1/download/health",
    tag = "download",
    responses(
        (status = 200, description = "Mirror reachable, session established"),
        (status = 503, description = "Mirror unreachable", body = crate::error::ApiError)
    )
)]
pub async fn download_health(State(state): State<AppState>) -> Response {
    match state.resolver.probe_session().await {
        Ok(session) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Pinterest download service is healthy",
                "service": "SnapPin",
                "timestamp": Utc::now(),
                "session": {
                    "hasToken": session.has_token(),
                    "hasCookies": !session.cookies.is_empty(),
                },
            })),
        )
            .into_response(),
        Err(error) => {
            tracing::error!(error = %error, "health probe failed");
            let body = if state.config.server.api.development {
                ApiError::with_details(
                    "Pinterest download service is unavailable",
                    json!({ "error": error.to_string() }),
                )
            } else {
                ApiError::new("Pinterest download service is unavailable")
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

/// POST/PUT/PATCH / - Root convenience resolution endpoint
///
/// Validates and resolves like the API POST endpoint but answers 200, not
/// 201. GET / is wired straight to [`get_download_info`].
pub async fn download_from_root(
    State(state): State<AppState>,
    Json(body): Json<DownloadRequest>,
) -> Response {
    let url = match require_valid_url(body.url) {
        Ok(url) => url,
        Err(response) => return response,
    };

    tracing::info!(url = %url, "root download request");

    match state.resolver.resolve(&url).await {
        Ok(resolution) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": resolution,
                "timestamp": Utc::now(),
            })),
        )
            .into_response(),
        Err(error) => resolution_failure(&state, StatusCode::BAD_REQUEST, error),
    }
}
