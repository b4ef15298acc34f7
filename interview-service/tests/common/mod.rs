#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use interview_service::config::{
    AiConfig, AiProviderKind, Environment, InterviewConfig, MongoConfig, RateLimitConfig,
    SecurityConfig, SessionConfig, StoreBackend, StoreConfig,
};
use interview_service::services::providers::mock::MockTextProvider;
use interview_service::services::{InterviewStore, MemoryStore};
use interview_service::{build_router, AppState};
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_USER_ID: &str = "test_user_123";
pub const OTHER_USER_ID: &str = "other_user_456";

pub fn test_config() -> InterviewConfig {
    InterviewConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port for testing
        },
        service_name: "interview-service".to_string(),
        environment: Environment::Dev,
        log_level: "error".to_string(),
        otlp_endpoint: None,
        mongodb: MongoConfig {
            uri: std::env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: format!("interview_test_{}", uuid::Uuid::new_v4()),
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
        },
        ai: AiConfig {
            provider: AiProviderKind::Mock,
            api_key: String::new(),
            text_model: "mock-interviewer".to_string(),
            api_base: "http://localhost".to_string(),
            temperature: 0.7,
            max_output_tokens: 1024,
            request_timeout_secs: 5,
        },
        sessions: SessionConfig {
            ai_context_messages: 20,
        },
        rate_limit: RateLimitConfig {
            generation_per_minute: 1000,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub provider: Arc<MockTextProvider>,
    pub store: Arc<dyn InterviewStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), test_config())
    }

    pub fn with_config(config: InterviewConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }

    pub fn with_store(store: Arc<dyn InterviewStore>, config: InterviewConfig) -> Self {
        let provider = Arc::new(MockTextProvider::new(true));
        let state = AppState::new(config, store.clone(), provider.clone());

        TestApp {
            router: build_router(state),
            provider,
            store,
        }
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header("x-user-id", user_id);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, user_id: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(user_id), None).await
    }

    pub async fn post(&self, uri: &str, user_id: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(user_id), Some(body))
            .await
    }

    pub async fn delete(&self, uri: &str, user_id: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(user_id), None).await
    }

    /// Generate an interview with the mock provider's canned questions.
    pub async fn create_interview(&self, user_id: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/interviews",
                user_id,
                serde_json::json!({
                    "role": "Backend Engineer",
                    "experience_level": "senior",
                    "interview_type": "technical",
                    "tech_stack": ["Rust", "MongoDB"],
                    "question_count": 3
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create interview failed: {}", body);
        body
    }

    /// Run a session action and return the status and body.
    pub async fn session_action(&self, user_id: &str, body: Value) -> (StatusCode, Value) {
        self.post("/api/sessions", user_id, body).await
    }

    /// Create a session as `user_id` (joined as interviewer) and return its id.
    pub async fn create_session(&self, user_id: &str) -> String {
        let (status, body) = self
            .session_action(
                user_id,
                serde_json::json!({
                    "action": "create",
                    "title": "Mock system design loop",
                    "role": "Staff Engineer"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create session failed: {}", body);
        body["session"]["session_id"]
            .as_str()
            .expect("session id")
            .to_string()
    }
}
