//! The resolution pipeline
//!
//! Orchestrates a pin resolution end to end. Each call runs the state machine
//!
//! ```text
//! NeedSession -> HasSession -> Submitted -> (Success | retry | terminal)
//! ```
//!
//! driven by an attempt counter: ensure (or forcibly renew) the session,
//! submit the pin URL to the mirror, hand the response body to the extractor,
//! and classify the outcome. Any retryable failure invalidates the shared
//! session, waits a fixed backoff and loops back to session renewal, up to
//! the configured retry budget. The terminal error flattens the attempt count
//! and the last failure into one message.
//!
//! The session cache is shared across concurrent resolutions without
//! per-request isolation: one request's invalidation can force another's next
//! attempt to re-authenticate. That is accepted — the cache is an
//! optimization, not a correctness guarantee, and every attempt re-validates
//! by simply trying the scrape.

use crate::config::{Config, RetryConfig, UpstreamConfig};
use crate::error::{Error, Result};
use crate::extractor;
use crate::session::{SecFetchSite, Session, SessionManager, browser_headers};
use crate::types::Resolution;
use reqwest::header::{COOKIE, ORIGIN, REFERER};
use reqwest::redirect;
use serde_json::json;

/// Header carrying the scraped CSRF token on scrape submissions
const CSRF_HEADER: &str = "X-CSRF-TOKEN";

/// Resolves Pinterest pin URLs to downloadable media via the upstream mirror
///
/// Cheap to share behind an `Arc`; all methods take `&self`. The embedded
/// session cache is the only mutable state.
pub struct PinResolver {
    client: reqwest::Client,
    sessions: SessionManager,
    upstream: UpstreamConfig,
    retry: RetryConfig,
}

impl PinResolver {
    /// Build a resolver from configuration.
    ///
    /// Constructs the shared HTTP client (fixed browser user agent, bounded
    /// redirect following) and the session manager around it.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.upstream.user_agent)
            .redirect(redirect::Policy::limited(config.upstream.max_redirects))
            .build()?;

        Ok(Self {
            sessions: SessionManager::new(client.clone(), config.upstream.clone()),
            client,
            upstream: config.upstream.clone(),
            retry: config.retry.clone(),
        })
    }

    /// Resolve a pin URL into media items and metadata.
    ///
    /// Retries up to `retry.max_retries` times on transient failures, forcing
    /// a session renewal before each retry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetriesExhausted`] once the retry budget is spent; the
    /// message embeds the attempt count and the last underlying failure.
    pub async fn resolve(&self, pin_url: &str) -> Result<Resolution> {
        let mut attempt: u32 = 0;

        loop {
            tracing::info!(url = %pin_url, attempt = attempt + 1, "processing pin URL");

            match self.attempt(pin_url, attempt > 0).await {
                Ok(resolution) => {
                    if attempt > 0 {
                        tracing::info!(attempts = attempt + 1, "resolution succeeded after retry");
                    }
                    return Ok(resolution);
                }
                Err(error) => {
                    // Every failure poisons the shared session
                    self.sessions.invalidate().await;
                    attempt += 1;

                    if !error.is_retryable() || attempt > self.retry.max_retries {
                        tracing::error!(error = %error, attempts = attempt, "resolution failed");
                        return Err(Error::RetriesExhausted {
                            attempts: attempt,
                            last_error: error.to_string(),
                        });
                    }

                    tracing::warn!(
                        error = %error,
                        attempt,
                        max_attempts = self.retry.max_retries + 1,
                        backoff_ms = self.retry.backoff.as_millis() as u64,
                        "attempt failed, renewing session and retrying"
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                }
            }
        }
    }

    /// One pass of the state machine: session, submission, extraction
    async fn attempt(&self, pin_url: &str, force_renewal: bool) -> Result<Resolution> {
        let session = if force_renewal {
            self.sessions.renew().await?
        } else {
            self.sessions.ensure().await?
        };

        let body = self.submit(pin_url, &session).await?;

        tracing::debug!(length = body.len(), "received upstream response");

        let extraction = extractor::extract(&body, pin_url)?;
        Ok(Resolution::from_extraction(extraction))
    }

    /// POST the pin URL to the mirror and return the response body
    async fn submit(&self, pin_url: &str, session: &Session) -> Result<String> {
        let response = self
            .client
            .post(&self.upstream.base_url)
            .headers(browser_headers(SecFetchSite::SameOrigin))
            .header(ORIGIN, self.upstream.base_url.as_str())
            .header(REFERER, format!("{}/", self.upstream.base_url))
            .header(CSRF_HEADER, session.csrf_token.as_str())
            .header(COOKIE, session.cookie_header())
            .timeout(self.upstream.submit_timeout)
            .json(&json!({ "url": pin_url }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Drop the cached session so the next resolution starts fresh.
    ///
    /// Used by the API's PUT endpoint to force a re-scrape with new
    /// credentials.
    pub async fn invalidate_session(&self) {
        tracing::info!("forcing session invalidation");
        self.sessions.invalidate().await;
    }

    /// Probe upstream reachability by forcing a session renewal.
    ///
    /// Returns the established session so callers can report token/cookie
    /// presence; used by the health endpoint.
    pub async fn probe_session(&self) -> Result<Session> {
        self.sessions.renew().await
    }
}
