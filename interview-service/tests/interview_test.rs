mod common;

use axum::http::StatusCode;
use common::{test_config, TestApp, OTHER_USER_ID, TEST_USER_ID};
use interview_service::services::providers::ProviderError;
use serde_json::json;

#[tokio::test]
async fn generate_interview_returns_numbered_questions() {
    let app = TestApp::new();

    let body = app.create_interview(TEST_USER_ID).await;

    assert_eq!(body["role"], "Backend Engineer");
    assert_eq!(body["experience_level"], "senior");
    assert_eq!(body["interview_type"], "technical");
    assert_eq!(body["model"], "mock-interviewer");

    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[0]["number"], 1);
    assert_eq!(questions[2]["number"], 3);
    assert!(questions[0]["question_id"].as_str().is_some());

    // The prompt reflects the request and asks for JSON.
    let prompts = app.provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].prompt.contains("Rust, MongoDB"));
    assert!(prompts[0].params.json_output);
}

#[tokio::test]
async fn generate_interview_accepts_plain_numbered_text() {
    let app = TestApp::new();
    app.provider
        .push_response("1. Why Rust?\n2. Explain the borrow checker.\n3. What is Send?");

    let (status, body) = app
        .post(
            "/api/interviews",
            TEST_USER_ID,
            json!({ "role": "Systems Engineer", "question_count": 2 }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[1]["text"], "Explain the borrow checker.");
    assert_eq!(questions[1]["difficulty"], "medium");
}

#[tokio::test]
async fn generate_interview_validates_input() {
    let app = TestApp::new();

    let (status, _) = app
        .post("/api/interviews", TEST_USER_ID, json!({ "company": "Acme" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "missing role");

    let (status, body) = app
        .post(
            "/api/interviews",
            TEST_USER_ID,
            json!({ "role": "Engineer", "question_count": 50 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation error");

    let (status, _) = app
        .post(
            "/api/interviews",
            TEST_USER_ID,
            json!({ "role": "Engineer", "experience_level": "wizard" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unknown enum value");

    assert!(app.provider.prompts().is_empty());
}

#[tokio::test]
async fn unusable_model_output_is_a_bad_gateway() {
    let app = TestApp::new();
    app.provider.push_response("I'd rather not.");

    let (status, _) = app
        .post("/api/interviews", TEST_USER_ID, json!({ "role": "Engineer" }))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, list) = app.get("/api/interviews", TEST_USER_ID).await;
    assert_eq!(list["count"], 0, "nothing is stored on failure");
}

#[tokio::test]
async fn provider_errors_map_to_http_statuses() {
    let app = TestApp::new();

    app.provider.push_error(ProviderError::RateLimited);
    let (status, _) = app
        .post("/api/interviews", TEST_USER_ID, json!({ "role": "Engineer" }))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    app.provider
        .push_error(ProviderError::NotConfigured("no key".to_string()));
    let (status, _) = app
        .post("/api/interviews", TEST_USER_ID, json!({ "role": "Engineer" }))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    app.provider
        .push_error(ProviderError::NetworkError("connection reset".to_string()));
    let (status, _) = app
        .post("/api/interviews", TEST_USER_ID, json!({ "role": "Engineer" }))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn interviews_are_scoped_to_their_owner() {
    let app = TestApp::new();
    let interview = app.create_interview(TEST_USER_ID).await;
    let id = interview["interview_id"].as_str().unwrap();
    let uri = format!("/api/interviews/{}", id);

    let (status, body) = app.get(&uri, TEST_USER_ID).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interview_id"], id);

    let (status, _) = app.get(&uri, OTHER_USER_ID).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&uri, OTHER_USER_ID).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.get("/api/interviews", OTHER_USER_ID).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn list_interviews_paginates_newest_first() {
    let app = TestApp::new();
    for _ in 0..3 {
        app.create_interview(TEST_USER_ID).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (status, all) = app.get("/api/interviews", TEST_USER_ID).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["count"], 3);
    assert_eq!(all["limit"], 20);
    assert_eq!(all["offset"], 0);

    let (_, page) = app
        .get("/api/interviews?limit=1&offset=1", TEST_USER_ID)
        .await;
    assert_eq!(page["count"], 1);
    assert_eq!(
        page["interviews"][0]["interview_id"],
        all["interviews"][1]["interview_id"]
    );

    let (_, clamped) = app.get("/api/interviews?limit=1000", TEST_USER_ID).await;
    assert_eq!(clamped["limit"], 100);
}

#[tokio::test]
async fn malformed_query_and_path_render_json_errors() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/interviews?limit=abc", TEST_USER_ID).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid query"));

    let (status, body) = app.get("/api/interviews/%FF", TEST_USER_ID).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid path"));
}

#[tokio::test]
async fn delete_interview_removes_it() {
    let app = TestApp::new();
    let interview = app.create_interview(TEST_USER_ID).await;
    let uri = format!(
        "/api/interviews/{}",
        interview["interview_id"].as_str().unwrap()
    );

    let (status, body) = app.delete(&uri, TEST_USER_ID).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = app.get(&uri, TEST_USER_ID).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generation_is_rate_limited_per_user() {
    let mut config = test_config();
    config.rate_limit.generation_per_minute = 2;
    let app = TestApp::with_config(config);

    for _ in 0..2 {
        app.create_interview(TEST_USER_ID).await;
    }

    let (status, _) = app
        .post("/api/interviews", TEST_USER_ID, json!({ "role": "Engineer" }))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Reads are not limited, and other callers have their own quota.
    let (status, _) = app.get("/api/interviews", TEST_USER_ID).await;
    assert_eq!(status, StatusCode::OK);
    app.create_interview(OTHER_USER_ID).await;
}
