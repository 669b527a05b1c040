//! Rate limiting middleware for the API
//!
//! A fixed-window counter per client IP, with support for exempt paths.
//! Applied as a blanket layer over every route when enabled.

use axum::{
    Json,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Instant,
};
use tokio::sync::Mutex;

use crate::config::RateLimitConfig;

/// Request counter for one window
struct Window {
    /// When the current window started
    started: Instant,
    /// Requests seen in the current window
    count: u32,
}

/// Rate limiter with per-IP fixed windows
pub struct RateLimiter {
    /// Per-IP window state
    windows: Mutex<HashMap<IpAddr, Window>>,
    /// Configuration
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter from configuration
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Check if a path is exempt from rate limiting
    fn is_path_exempt(&self, path: &str) -> bool {
        self.config.exempt_paths.iter().any(|exempt| {
            // Support both exact matches and prefix matches
            path == exempt || path.starts_with(exempt)
        })
    }

    /// Check if a request should be rate limited.
    ///
    /// Returns `None` when the request is allowed, or `Some(retry_after)` in
    /// seconds when the caller has exhausted the current window.
    pub async fn check(&self, path: &str, addr: SocketAddr) -> Option<u64> {
        if self.is_path_exempt(path) {
            return None;
        }

        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows.entry(addr.ip()).or_insert(Window {
            started: now,
            count: 0,
        });

        // Roll over to a fresh window once the old one has elapsed
        if now.duration_since(window.started) >= self.config.window {
            window.started = now;
            window.count = 0;
        }

        if window.count < self.config.max_requests {
            window.count += 1;
            None
        } else {
            let remaining = self
                .config
                .window
                .saturating_sub(now.duration_since(window.started));
            Some(remaining.as_secs().max(1))
        }
    }
}

/// Rate limiting middleware function
pub async fn rate_limit_middleware(
    axum::extract::State(limiter): axum::extract::State<Arc<RateLimiter>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: axum::middleware::Next,
) -> Response {
    match limiter.check(req.uri().path(), addr).await {
        None => next.run(req).await,
        Some(retry_after) => {
            let body = json!({
                "status": "error",
                "message": "Too many requests, please try again later.",
                "details": {
                    "retry_after_seconds": retry_after
                }
            });
            (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
        }
    }
}
