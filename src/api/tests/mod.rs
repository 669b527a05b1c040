use super::*;
use crate::config::Config;
use axum::body::Body;
use axum::http::Request;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod download;

const PIN_URL: &str = "https://www.pinterest.com/pin/1234567890/";

const LANDING_PAGE: &str = r#"<html><head>
    <meta name="csrf-token" content="tok-123">
</head><body></body></html>"#;

const VIDEO_PAGE: &str = r#"<html><head>
    <title>Resolved Pin - Snappin</title>
    <meta name="description" content="A lovely pin">
</head><body>
    <video><source src="//cdn/x.mp4" label="720p"></video>
    <a href="https://mirror/download/123">Download</a>
</body></html>"#;

const ERROR_PAGE: &str = r#"<html><body>
    <div class="error">Pin not found</div>
</body></html>"#;

/// Config pointed at a mock upstream, tuned for fast tests.
///
/// Rate limiting is disabled because `oneshot()` requests carry no
/// `ConnectInfo`; the dedicated rate-limit test runs a real server.
fn test_config(upstream_uri: &str) -> Config {
    let mut config = Config::default();
    config.upstream.base_url = upstream_uri.to_string();
    config.retry.backoff = Duration::from_millis(10);
    config.server.api.rate_limit.enabled = false;
    config
}

/// Build a router over a fresh resolver for the given config
fn test_app(config: Config) -> Router {
    let config = Arc::new(config);
    let resolver = Arc::new(PinResolver::new(&config).expect("resolver must build"));
    create_router(resolver, config)
}

async fn mount_landing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "XSRF-TOKEN=abc; Path=/; HttpOnly")
                .set_body_string(LANDING_PAGE),
        )
        .mount(server)
        .await;
}

async fn mount_scrape_response(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Mock upstream that resolves every submission to the video fixture
async fn healthy_upstream() -> MockServer {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    mount_scrape_response(&server, ResponseTemplate::new(200).set_body_string(VIDEO_PAGE)).await;
    server
}

fn json_request(http_method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(http_method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request must build")
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body must be readable");
    serde_json::from_slice(&body).expect("body must be JSON")
}

async fn count_requests(server: &MockServer, http_method: &str) -> usize {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .filter(|request| request.method.as_str() == http_method)
        .count()
}
