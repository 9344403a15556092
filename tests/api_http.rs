//! HTTP entry point tests
//!
//! These exercise the router without a browser: validation and CORS must
//! resolve before any scraping state is touched, so a lazy (never-launched)
//! browser manager is enough.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use pricehound::{AppState, BrowserManager, ScrapeConfig, build_app};
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let config = Arc::new(ScrapeConfig::default());
    let browser = BrowserManager::new(
        config.user_agent.clone(),
        config.accept_language.clone(),
    );
    build_app(AppState { browser, config })
}

#[tokio::test]
async fn empty_query_is_rejected_before_scraping() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/prices?q=")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["error"].as_str(), Some("empty query"));
}

#[tokio::test]
async fn missing_query_parameter_is_rejected() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/prices")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn whitespace_post_body_is_rejected() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/prices")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"q": "   "}"#))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["error"].as_str(), Some("empty query"));
}

#[tokio::test]
async fn post_without_body_keeps_json_error_shape() {
    // No body and no Content-Type must not surface axum's plain-text
    // rejection; it degrades to the empty-query error.
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/prices")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["error"].as_str(), Some("empty query"));
}

#[tokio::test]
async fn post_with_wrong_content_type_keeps_json_error_shape() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/prices")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("laptop"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["error"].as_str(), Some("empty query"));
}

#[tokio::test]
async fn options_preflight_short_circuits_with_cors_headers() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/prices")
                .header(header::ORIGIN, "https://widget.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert!(
        response.status().is_success(),
        "preflight status: {}",
        response.status()
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let allowed_methods = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(allowed_methods.contains("POST"), "{allowed_methods}");
}

#[tokio::test]
async fn cross_origin_get_carries_allow_origin_header() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/prices?q=")
                .header(header::ORIGIN, "https://widget.example")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    // Even error responses must be readable cross-origin.
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn health_endpoint_responds() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}
