mod common;

use axum::http::{Method, StatusCode};
use common::{test_config, TestApp, TEST_USER_ID};
use interview_service::startup::Application;

#[tokio::test]
async fn health_reports_store_and_provider() {
    let app = TestApp::new();

    let (status, body) = app.get("/health", TEST_USER_ID).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "interview-service");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["provider"], "mock");
}

#[tokio::test]
async fn ready_when_store_and_provider_are_usable() {
    let app = TestApp::new();

    let (status, _) = app.request(Method::GET, "/ready", None, None).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_serves_prometheus_text() {
    interview_service::services::init_metrics();
    let app = TestApp::new();

    let (status, _) = app.request(Method::GET, "/metrics", None, None).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn api_routes_require_user_id() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/api/interviews", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("X-User-ID"));

    let (status, _) = app
        .request(Method::GET, "/api/sessions", Some("   "), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn responses_carry_security_and_request_id_headers() {
    let app = TestApp::new();
    let request = axum::http::Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn application_serves_health_over_tcp() {
    let app = Application::build(test_config())
        .await
        .expect("Failed to build test application");
    let port = app.port();

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let client = reqwest::Client::new();
    let health_url = format!("http://127.0.0.1:{}/health", port);
    let mut response = None;
    for _ in 0..50 {
        if let Ok(r) = client.get(&health_url).send().await {
            response = Some(r);
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    let response = response.expect("server did not start");
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}
