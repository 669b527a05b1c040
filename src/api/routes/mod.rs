//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`download`] — Resolution endpoints (create, query, refresh, partial)
//! - [`system`] — Liveness, OpenAPI, 404 fallback

use serde::{Deserialize, Serialize};

mod download;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use download::*;
pub use system::*;

// ============================================================================
// Request Types (shared across handlers)
// ============================================================================

/// Request body for POST/PUT download endpoints
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadRequest {
    /// The Pinterest pin URL (or pin.it short link) to resolve
    ///
    /// Optional in the wire format so its absence maps to a 400 validation
    /// error rather than a body-rejection status.
    pub url: Option<String>,
}

/// Query parameters for GET download endpoints
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadQuery {
    /// The Pinterest pin URL to resolve
    pub url: Option<String>,
}

/// Request body for PATCH /download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PatchRequest {
    /// The Pinterest pin URL to resolve
    pub url: Option<String>,

    /// Which subset of the result to return
    #[serde(default)]
    pub options: PatchOptions,
}

/// Partial-response selection for PATCH /download
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatchOptions {
    /// Return only metadata, kind and timestamp
    #[serde(default)]
    pub metadata_only: bool,

    /// Return only the resolved media URLs and timestamp
    #[serde(default)]
    pub urls_only: bool,
}
