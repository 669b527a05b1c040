//! REST API server module
//!
//! Provides the HTTP surface around the resolution pipeline: route wiring,
//! request validation, rate limiting, CORS, and OpenAPI documentation.

use crate::{Config, PinResolver, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post, put},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Resolution
/// - `POST /api/v1/download` - Resolve a pin URL (201 on success)
/// - `GET /api/v1/download?url=...` - Retrieve download info (200/404)
/// - `PUT /api/v1/download` - Re-resolve with forced session invalidation
/// - `PATCH /api/v1/download` - Resolve and return a filtered subset
/// - `GET /api/v1/download/health` - Upstream session probe (200/503)
///
/// ## Root conveniences
/// - `POST /`, `PUT /`, `PATCH /` - Resolve a pin URL (200 on success)
/// - `GET /?url=...` - Retrieve download info
///
/// ## System
/// - `GET /health-check` - Liveness only, no upstream contact
/// - `GET /api/v1/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive documentation (if enabled)
/// - Anything else - structured 404
pub fn create_router(resolver: Arc<PinResolver>, config: Arc<Config>) -> Router {
    let state = AppState::new(resolver, config.clone());

    let api = Router::new()
        .route("/download", post(routes::create_download))
        .route("/download", get(routes::get_download_info))
        .route("/download", put(routes::update_download))
        .route("/download", patch(routes::patch_download))
        .route("/download/health", get(routes::download_health))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = Router::new()
        .nest("/api/v1", api)
        // Root conveniences mirror the API endpoints
        .route(
            "/",
            post(routes::download_from_root)
                .get(routes::get_download_info)
                .put(routes::download_from_root)
                .patch(routes::download_from_root),
        )
        .route("/health-check", get(routes::health_check))
        .fallback(routes::not_found);

    // Merge Swagger UI routes if enabled in config (before applying state)
    // Note: SwaggerUi will use the existing /openapi.json endpoint we already defined
    let router = if config.server.api.swagger_ui {
        router.merge(
            SwaggerUi::new("/swagger-ui")
                .config(utoipa_swagger_ui::Config::new(["/api/v1/openapi.json"])),
        )
    } else {
        router
    };

    // Add state to all routes
    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    // Middleware layer ordering: In Axum's onion model, the LAST layer applied
    // is the OUTERMOST (runs first on requests). We want:
    //   Request → CORS → Rate Limit → Handler

    // Apply rate limiting middleware if enabled in config
    let router = if config.server.api.rate_limit.enabled {
        let limiter = Arc::new(rate_limit::RateLimiter::new(
            config.server.api.rate_limit.clone(),
        ));
        router.layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::rate_limit_middleware,
        ))
    } else {
        router
    };

    // Apply CORS middleware if enabled in config (outermost — runs first)
    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// # Arguments
///
/// * `origins` - List of allowed origins (supports "*" for any origin)
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    // Check if "*" (all origins) is in the list
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        // Allow all origins (default for local development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Allow specific origins
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// This function creates a TCP listener, binds it to the configured address,
/// and serves the API router until a termination signal arrives.
///
/// # Arguments
///
/// * `resolver` - Arc-wrapped PinResolver instance handling resolutions
/// * `config` - Arc-wrapped Config containing API configuration
///
/// # Example
///
/// ```no_run
/// use pinterest_dl::{Config, PinResolver};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let resolver = Arc::new(PinResolver::new(&config)?);
///
/// // Start API server (blocks until shutdown)
/// pinterest_dl::api::start_api_server(resolver, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(resolver: Arc<PinResolver>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(
        address = %bind_address,
        development = config.server.api.development,
        "Starting API server"
    );

    // Create the router with all routes
    let app = create_router(resolver, config);

    // Bind TCP listener to the configured address
    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    // Serve the API using the listener
    // Must use into_make_service_with_connect_info to provide ConnectInfo<SocketAddr>
    // for the rate limiting middleware
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(crate::shutdown_signal())
    .await
    .map_err(|e| crate::error::Error::ApiServer(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
