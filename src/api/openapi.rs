//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the pinterest-dl REST
//! API using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the pinterest-dl REST API
///
/// This struct is used to generate the OpenAPI specification that describes
/// all available endpoints, request/response types, and API behavior.
///
/// The spec can be accessed via:
/// - `/api/v1/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "pinterest-dl REST API",
        version = "0.2.0",
        description = "REST API for resolving Pinterest pin URLs into downloadable media via an upstream mirror",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Resolution
        crate::api::routes::create_download,
        crate::api::routes::get_download_info,
        crate::api::routes::update_download,
        crate::api::routes::patch_download,
        crate::api::routes::download_health,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::MediaKind,
        crate::types::MediaItem,
        crate::types::Metadata,
        crate::types::Resolution,

        // Config types from config.rs
        crate::config::Config,
        crate::config::UpstreamConfig,
        crate::config::RetryConfig,
        crate::config::ServerIntegrationConfig,
        crate::config::ApiConfig,
        crate::config::RateLimitConfig,

        // API request types from routes
        crate::api::routes::DownloadRequest,
        crate::api::routes::DownloadQuery,
        crate::api::routes::PatchRequest,
        crate::api::routes::PatchOptions,

        // Error types from error.rs
        crate::error::ApiError,
    )),
    tags(
        (name = "download", description = "Pin resolution - Resolve Pinterest URLs into downloadable media"),
        (name = "system", description = "System endpoints - Liveness and OpenAPI spec"),
    )
)]
pub struct ApiDoc;
