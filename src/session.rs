//! Upstream session management
//!
//! The mirror requires a CSRF-style token and a cookie set before it accepts
//! scrape submissions. This module owns the process-wide session cache:
//! fetching the landing page, scraping the token, capturing `Set-Cookie`
//! headers verbatim, and guarding the cached state behind an async mutex so
//! concurrent resolutions serialize their read-modify-write.
//!
//! The cache is best-effort only — a stale session just makes the next scrape
//! attempt fail, which the pipeline answers with a forced renewal.

use crate::config::UpstreamConfig;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tokio::sync::Mutex;

static CSRF_META: LazyLock<Selector> = LazyLock::new(|| static_selector(r#"meta[name="csrf-token"]"#));
static CSRF_INPUT: LazyLock<Selector> = LazyLock::new(|| static_selector(r#"input[name="_token"]"#));

// Selectors are compile-time constants; a parse failure is a programmer error
// caught by the unit tests below.
#[allow(clippy::expect_used)]
fn static_selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Credentials for submitting scrape requests to the mirror
///
/// `cookies` holds the raw `Set-Cookie` header values in response order.
/// `csrf_token` may be empty — the mirror tolerates submissions without one,
/// so a missing token is not an error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// Verbatim `Set-Cookie` values from the landing-page response
    pub cookies: Vec<String>,
    /// CSRF token scraped from the landing page (empty when absent)
    pub csrf_token: String,
}

impl Session {
    /// Build the `Cookie` request header value: the first `;`-delimited
    /// segment of each captured cookie, joined with `"; "`.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .filter_map(|cookie| cookie.split(';').next())
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// True when a CSRF token was scraped
    pub fn has_token(&self) -> bool {
        !self.csrf_token.is_empty()
    }
}

/// Owns the shared session cache and knows how to (re)establish it
pub struct SessionManager {
    client: reqwest::Client,
    upstream: UpstreamConfig,
    current: Mutex<Option<Session>>,
}

impl SessionManager {
    /// Create a manager around an existing client (shared with the pipeline)
    pub fn new(client: reqwest::Client, upstream: UpstreamConfig) -> Self {
        Self {
            client,
            upstream,
            current: Mutex::new(None),
        }
    }

    /// Snapshot of the cached session, if any
    pub async fn cached(&self) -> Option<Session> {
        self.current.lock().await.clone()
    }

    /// Return the cached session, establishing one if the cache is empty
    pub async fn ensure(&self) -> Result<Session> {
        if let Some(session) = self.cached().await {
            return Ok(session);
        }
        self.renew().await
    }

    /// Establish a fresh session and overwrite the cache.
    ///
    /// On failure the previous cached state is left untouched and the error
    /// propagates to the caller.
    pub async fn renew(&self) -> Result<Session> {
        let session = self.establish().await?;
        *self.current.lock().await = Some(session.clone());
        Ok(session)
    }

    /// Drop the cached session
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }

    async fn establish(&self) -> Result<Session> {
        tracing::info!(url = %self.upstream.base_url, "initializing upstream session");

        let response = self
            .client
            .get(&self.upstream.base_url)
            .headers(browser_headers(SecFetchSite::None))
            .timeout(self.upstream.landing_timeout)
            .send()
            .await
            .map_err(|e| Error::Session(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Session(format!("upstream returned HTTP {status}")));
        }

        let cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| Error::Session(e.to_string()))?;
        let csrf_token = csrf_token_from_html(&body);

        tracing::info!(
            has_token = !csrf_token.is_empty(),
            cookie_count = cookies.len(),
            "session initialized"
        );

        Ok(Session {
            cookies,
            csrf_token,
        })
    }
}

/// Scrape the CSRF token from a landing page.
///
/// Priority: `meta[name="csrf-token"]` `content` attr, then its `value` attr,
/// then a hidden `input[name="_token"]` `value` attr. Absent token yields an
/// empty string.
fn csrf_token_from_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let meta = document.select(&CSRF_META).next();

    meta.and_then(|element| element.value().attr("content"))
        .or_else(|| meta.and_then(|element| element.value().attr("value")))
        .or_else(|| {
            document
                .select(&CSRF_INPUT)
                .next()
                .and_then(|element| element.value().attr("value"))
        })
        .unwrap_or_default()
        .to_string()
}

/// Which `Sec-Fetch-Site` value a request presents
#[derive(Clone, Copy)]
pub(crate) enum SecFetchSite {
    /// Top-level navigation (landing-page fetch)
    None,
    /// Submission back to the same origin (scrape POST)
    SameOrigin,
}

/// Realistic browser navigation headers for mirror requests.
///
/// The user agent is set client-wide; these cover the Accept and Sec-Fetch
/// families the mirror expects from a real browser. `Accept-Encoding` is
/// deliberately left to the client, which negotiates what it can decode.
pub(crate) fn browser_headers(site: SecFetchSite) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "Accept",
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        "Accept-Language",
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
    headers.insert(
        "Sec-Fetch-Site",
        HeaderValue::from_static(match site {
            SecFetchSite::None => "none",
            SecFetchSite::SameOrigin => "same-origin",
        }),
    );
    headers.insert("Sec-Fetch-User", HeaderValue::from_static("?1"));
    headers
}
