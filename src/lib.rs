//! # pinterest-dl
//!
//! Backend library for resolving Pinterest pin URLs into downloadable media.
//!
//! Given a pin URL, the resolver establishes a session with a third-party
//! mirror site, submits the URL, scrapes the returned HTML for video/image
//! sources, and retries with a forced session renewal when the mirror
//! misbehaves. A REST API wraps the resolver for service deployments.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - The resolver and router are embeddable; the server
//!   binary is a thin shell around them
//! - **Sensible defaults** - `Config::default()` targets the production
//!   mirror and works with zero configuration
//! - **Deterministic scraping core** - HTML extraction is a pure function,
//!   unit-tested against fixed fixtures
//! - **Best-effort session cache** - shared credentials are an optimization;
//!   correctness comes from retrying the scrape itself
//!
//! ## Quick Start
//!
//! ```no_run
//! use pinterest_dl::{Config, PinResolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let resolver = PinResolver::new(&config)?;
//!
//!     let resolution = resolver
//!         .resolve("https://www.pinterest.com/pin/1234567890/")
//!         .await?;
//!     println!("{} item(s) of kind {}", resolution.urls.len(), resolution.kind);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// HTML extraction for mirror result pages
pub mod extractor;
/// The resolution pipeline
pub mod resolver;
/// Upstream session management
pub mod session;
/// Core types
pub mod types;
/// Pinterest URL validation
pub mod validation;

// Re-export commonly used types
pub use config::{ApiConfig, Config, RateLimitConfig, RetryConfig, UpstreamConfig};
pub use error::{ApiError, Error, Result, ToHttpStatus};
pub use resolver::PinResolver;
pub use session::{Session, SessionManager};
pub use types::{Extraction, MediaItem, MediaKind, Metadata, Resolution};

/// Wait for a termination signal.
///
/// Used by the API server for graceful shutdown.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with a Ctrl+C fallback if
///   signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        _ => {
            tracing::warn!("Could not register signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

/// Wait for a termination signal.
///
/// Used by the API server for graceful shutdown.
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
