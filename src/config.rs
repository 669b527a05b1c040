//! Configuration types for pinterest-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use utoipa::ToSchema;

/// Main configuration for the resolution service
///
/// All fields have sensible defaults; `Config::default()` works out of the
/// box against the production mirror. Sub-configs:
/// - [`upstream`](UpstreamConfig) — the mirror endpoint and request shaping
/// - [`retry`](RetryConfig) — the pipeline's retry/backoff policy
/// - [`server`](ServerIntegrationConfig) — REST API settings (flattened)
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Upstream mirror settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Retry policy for resolution attempts
    #[serde(default)]
    pub retry: RetryConfig,

    /// API server integration
    #[serde(flatten)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Build a configuration from process environment variables.
    ///
    /// Recognized variables:
    /// - `PORT` — listening port (bind address stays `0.0.0.0`)
    /// - `RATE_LIMIT_WINDOW_MS` — rate limit window in milliseconds
    /// - `RATE_LIMIT_MAX_REQUESTS` — max requests per window per IP
    /// - `APP_ENV` — `development` enables error detail in 5xx responses
    /// - `UPSTREAM_BASE_URL` — override the mirror base URL
    ///
    /// Unset variables keep their defaults; malformed values are a
    /// [`Error::Config`].
    pub fn from_env() -> Result<Self> {
        Self::from_env_map(&std::env::vars().collect())
    }

    /// Same as [`Config::from_env`], reading from an explicit map.
    ///
    /// Split out so tests can exercise environment handling without mutating
    /// process globals.
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = vars.get("PORT") {
            let port: u16 = port.parse().map_err(|_| Error::Config {
                message: format!("invalid port: {port}"),
                key: Some("PORT".to_string()),
            })?;
            config.server.api.bind_address = SocketAddr::from(([0, 0, 0, 0], port));
        }

        if let Some(window) = vars.get("RATE_LIMIT_WINDOW_MS") {
            let millis: u64 = window.parse().map_err(|_| Error::Config {
                message: format!("invalid rate limit window: {window}"),
                key: Some("RATE_LIMIT_WINDOW_MS".to_string()),
            })?;
            config.server.api.rate_limit.window = Duration::from_millis(millis);
        }

        if let Some(max) = vars.get("RATE_LIMIT_MAX_REQUESTS") {
            let max: u32 = max.parse().map_err(|_| Error::Config {
                message: format!("invalid rate limit max: {max}"),
                key: Some("RATE_LIMIT_MAX_REQUESTS".to_string()),
            })?;
            config.server.api.rate_limit.max_requests = max;
        }

        if let Some(env) = vars.get("APP_ENV") {
            config.server.api.development = env == "development";
        }

        if let Some(base_url) = vars.get("UPSTREAM_BASE_URL") {
            config.upstream.base_url = base_url.trim_end_matches('/').to_string();
        }

        Ok(config)
    }
}

/// Upstream mirror configuration
///
/// The base URL is configurable so tests can point the pipeline at a mock
/// server; production deployments use the default.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UpstreamConfig {
    /// Base URL of the mirror (landing page and scrape submission endpoint)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent presented to the mirror
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for the landing-page fetch during session setup (default: 10s)
    #[serde(default = "default_landing_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub landing_timeout: Duration,

    /// Timeout for the scrape submission request (default: 15s)
    #[serde(default = "default_submit_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub submit_timeout: Duration,

    /// Maximum redirect hops followed on mirror requests (default: 5)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            landing_timeout: default_landing_timeout(),
            submit_timeout: default_submit_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Retry policy for resolution attempts
///
/// Every retry forces a session renewal before resubmitting; the backoff is a
/// fixed interval, not exponential — the mirror either recovers within a
/// second or the pin is genuinely unresolvable.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt (default: 2,
    /// i.e. 3 total attempts)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts (default: 1 second)
    #[serde(default = "default_backoff", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff: default_backoff(),
        }
    }
}

/// API and external server integration
///
/// Groups settings for external access interfaces.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:3000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Development mode: include underlying error detail in 5xx responses and
    /// enable debug logging (default: false)
    #[serde(default)]
    pub development: bool,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            development: false,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Rate limiting configuration
///
/// A fixed window counter per client IP, applied as a blanket limiter at the
/// API boundary.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RateLimitConfig {
    /// Enable rate limiting (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum requests per window per IP (default: 100)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length (default: 900 seconds / 15 minutes)
    #[serde(default = "default_window", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub window: Duration,

    /// Endpoints exempt from rate limiting
    #[serde(default = "default_exempt_paths")]
    pub exempt_paths: Vec<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window: default_window(),
            exempt_paths: default_exempt_paths(),
        }
    }
}

fn default_base_url() -> String {
    "https://snappin.app".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_landing_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_submit_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff() -> Duration {
    Duration::from_secs(1)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_true() -> bool {
    true
}

fn default_max_requests() -> u32 {
    100
}

fn default_window() -> Duration {
    Duration::from_secs(900)
}

fn default_exempt_paths() -> Vec<String> {
    vec!["/health-check".into()]
}

// Duration serialization helper (seconds granularity)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
