use super::*;
use axum::http::StatusCode;

#[tokio::test]
async fn post_download_resolves_and_returns_201() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(json_request("POST", "/api/v1/download", serde_json::json!({ "url": PIN_URL })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Download request created successfully");
    assert_eq!(body["data"]["type"], "video");
    assert_eq!(body["data"]["urls"][0]["url"], "https://cdn/x.mp4");
    assert_eq!(body["data"]["urls"][0]["quality"], "720p");
    assert_eq!(body["data"]["downloadLink"], "https://mirror/download/123");
    assert_eq!(body["data"]["metadata"]["title"], "Resolved Pin");
    assert_eq!(body["data"]["metadata"]["description"], "A lovely pin");
    assert_eq!(body["data"]["metadata"]["source"], PIN_URL);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn post_download_rejects_non_pinterest_url() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/download",
            serde_json::json!({ "url": "https://example.com/pin/1/" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Validation error");
    assert!(
        body["details"][0]
            .as_str()
            .unwrap()
            .contains("Pinterest URL"),
        "details must name the URL pattern requirement: {body}"
    );

    // Validation rejects before the pipeline ever talks to the mirror
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn post_download_requires_a_url() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(json_request("POST", "/api/v1/download", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Validation error");
    assert_eq!(body["details"][0], "URL is required");
}

#[tokio::test]
async fn post_download_maps_terminal_failure_to_400() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    mount_scrape_response(&server, ResponseTemplate::new(500)).await;

    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(json_request("POST", "/api/v1/download", serde_json::json!({ "url": PIN_URL })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["status"], "error");
    let message = body["message"].as_str().unwrap();
    assert!(
        message.contains("3 attempts"),
        "terminal message should embed the attempt count: {message}"
    );
    assert_eq!(count_requests(&server, "POST").await, 3);
}

#[tokio::test]
async fn get_download_requires_the_url_parameter() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/download")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["message"], "URL query parameter is required");
}

#[tokio::test]
async fn get_download_returns_200_with_the_resolution() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let uri = format!("/api/v1/download?url={PIN_URL}");
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["type"], "video");
}

#[tokio::test]
async fn get_download_maps_resolution_failure_to_404() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    mount_scrape_response(&server, ResponseTemplate::new(200).set_body_string(ERROR_PAGE)).await;

    let app = test_app(test_config(&server.uri()));

    let uri = format!("/api/v1/download?url={PIN_URL}");
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert!(
        body["message"].as_str().unwrap().contains("Pin not found"),
        "the upstream error text must surface: {body}"
    );
}

#[tokio::test]
async fn put_download_forces_session_invalidation() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    // First resolution establishes and caches a session
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/download", serde_json::json!({ "url": PIN_URL })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(count_requests(&server, "GET").await, 1);

    // PUT must drop the cached session and establish a fresh one
    let response = app
        .oneshot(json_request("PUT", "/api/v1/download", serde_json::json!({ "url": PIN_URL })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Download request updated successfully");
    assert_eq!(
        count_requests(&server, "GET").await,
        2,
        "PUT must re-fetch the landing page despite the warm cache"
    );
}

#[tokio::test]
async fn patch_metadata_only_filters_the_payload() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/v1/download",
            serde_json::json!({ "url": PIN_URL, "options": { "metadataOnly": true } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(data["type"], "video");
    assert_eq!(data["metadata"]["title"], "Resolved Pin");
    assert!(data["timestamp"].is_string());
    assert!(data.get("urls").is_none(), "urls must be omitted: {data}");
    assert!(
        data.get("downloadLink").is_none(),
        "downloadLink must be omitted: {data}"
    );
}

#[tokio::test]
async fn patch_urls_only_filters_the_payload() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/v1/download",
            serde_json::json!({ "url": PIN_URL, "options": { "urlsOnly": true } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(data["urls"][0]["url"], "https://cdn/x.mp4");
    assert!(data.get("metadata").is_none());
    assert!(data.get("type").is_none());
}

#[tokio::test]
async fn patch_without_options_returns_the_full_payload() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/v1/download",
            serde_json::json!({ "url": PIN_URL }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Partial update successful");
    assert_eq!(body["data"]["type"], "video");
    assert!(body["data"]["metadata"].is_object());
}

#[tokio::test]
async fn patch_requires_a_url() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/v1/download",
            serde_json::json!({ "options": { "metadataOnly": true } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["message"], "URL is required");
}

#[tokio::test]
async fn root_post_resolves_with_200() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(json_request("POST", "/", serde_json::json!({ "url": PIN_URL })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["type"], "video");
}

#[tokio::test]
async fn root_get_resolves_like_the_api_get() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let uri = format!("/?url={PIN_URL}");
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn download_health_reports_session_state() {
    let server = healthy_upstream().await;
    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/download/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["service"], "SnapPin");
    assert_eq!(body["session"]["hasToken"], true);
    assert_eq!(body["session"]["hasCookies"], true);
}

#[tokio::test]
async fn download_health_returns_503_when_upstream_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = test_app(test_config(&server.uri()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/download/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Pinterest download service is unavailable");
    assert!(
        body.get("details").is_none(),
        "error detail must be suppressed outside development mode"
    );
}

#[tokio::test]
async fn download_health_includes_detail_in_development_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.server.api.development = true;
    let app = test_app(config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/download/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = response_json(response).await;
    assert!(
        body["details"]["error"].as_str().unwrap().contains("500"),
        "development mode must expose the underlying failure: {body}"
    );
}
