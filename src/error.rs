//! Error types for pinterest-dl
//!
//! This module provides error handling for the whole crate, including:
//! - Domain-specific error variants (validation, session, scraping, transport)
//! - HTTP status code mapping for API integration
//! - The JSON error body returned by API endpoints
//! - Retryability classification driving the resolution pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for pinterest-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pinterest-dl
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Request validation failed (malformed or non-Pinterest URL)
    #[error("{0}")]
    Validation(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "PORT")
        key: Option<String>,
    },

    /// Session establishment with the upstream mirror failed
    #[error("failed to initialize download session: {0}")]
    Session(String),

    /// The upstream mirror's own HTML reported a failure message
    #[error("service error: {0}")]
    UpstreamReported(String),

    /// The upstream response was well-formed but contained no extractable media
    #[error("no media found in the response")]
    NoMediaFound,

    /// Network error during the scrape request
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The scrape request returned a non-2xx status
    #[error("upstream returned HTTP {status}")]
    UpstreamStatus {
        /// The HTTP status code the upstream responded with
        status: u16,
    },

    /// The resolution pipeline exhausted its retry budget
    #[error("download failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Total number of attempts made (retries + 1)
        attempts: u32,
        /// Message of the last underlying failure
        last_error: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServer(String),
}

impl Error {
    /// Returns true if the error is transient and a resolution attempt should
    /// be retried with a fresh session.
    ///
    /// Failures produced while talking to the upstream mirror (session setup,
    /// transport, non-2xx status, upstream-reported errors, missing media) are
    /// all retryable: any of them can be caused by a stale or invalidated
    /// session. Local errors (validation, configuration, serialization) are
    /// permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            // Anything the upstream produced may succeed with a fresh session
            Error::Session(_) => true,
            Error::UpstreamReported(_) => true,
            Error::NoMediaFound => true,
            Error::UpstreamStatus { .. } => true,
            Error::Network(_) => true,
            // Local errors are permanent
            Error::Validation(_) => false,
            Error::Config { .. } => false,
            Error::Io(_) => false,
            Error::Serialization(_) => false,
            Error::ApiServer(_) => false,
            // Already terminal
            Error::RetriesExhausted { .. } => false,
        }
    }
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs. It uses
/// the same envelope as success responses (`status` + `message` + `timestamp`)
/// with optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "status": "error",
///   "message": "Validation error",
///   "details": ["URL must be a valid Pinterest URL (e.g., pinterest.com/pin/... or pin.it/...)"],
///   "timestamp": "2024-01-01T00:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Always the literal string `"error"`
    pub status: String,

    /// Human-readable error message
    ///
    /// This is suitable for displaying to end users.
    pub message: String,

    /// Optional additional context about the error
    ///
    /// This can include validation messages, retry hints, etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,

    /// When the error response was generated
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    /// Create a new API error with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an API error with additional details
    pub fn with_details(message: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: Some(details),
            timestamp: Utc::now(),
        }
    }

    /// Create a "validation error" error carrying the individual messages
    pub fn validation(messages: Vec<String>) -> Self {
        Self::with_details("Validation error", serde_json::json!(messages))
    }

    /// Create an "internal server error" with the detail suppressed
    pub fn internal() -> Self {
        Self::new("Internal server error")
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Validation(_) => 400,
            Error::Config { .. } => 400,
            // Terminal pipeline failures surface as a client-visible 400 by
            // default; GET-style handlers map them to 404 themselves
            Error::RetriesExhausted { .. } => 400,

            // 404 Not Found
            Error::NoMediaFound => 404,

            // 502 Bad Gateway - External service errors
            Error::UpstreamReported(_) => 502,
            Error::Network(_) => 502,
            Error::UpstreamStatus { .. } => 502,

            // 503 Service Unavailable - session setup with the mirror failed
            Error::Session(_) => 503,

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServer(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::Config { .. } => "config_error",
            Error::Session(_) => "session_error",
            Error::UpstreamReported(_) => "upstream_error",
            Error::NoMediaFound => "no_media_found",
            Error::Network(_) => "network_error",
            Error::UpstreamStatus { .. } => "upstream_status",
            Error::RetriesExhausted { .. } => "retries_exhausted",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServer(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let message = error.to_string();

        // Add contextual details for specific error types
        let details = match &error {
            Error::RetriesExhausted {
                attempts,
                last_error,
            } => Some(serde_json::json!({
                "attempts": attempts,
                "last_error": last_error,
            })),
            Error::UpstreamStatus { status } => Some(serde_json::json!({
                "upstream_status": status,
            })),
            _ => None,
        };

        Self {
            status: "error".to_string(),
            message,
            details,
            timestamp: Utc::now(),
        }
    }
}
