pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    create_keyed_rate_limiter, metrics_middleware, request_id_middleware,
    security_headers_middleware, user_rate_limit_middleware, KeyedRateLimiter, USER_ID_HEADER,
};
use service_core::observability::REQUEST_ID_HEADER;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::InterviewConfig;
use crate::services::providers::GenerationParams;
use crate::services::{InterviewService, InterviewStore, SessionService, TextProvider};

const RATE_LIMIT_WINDOW_SECONDS: u64 = 60;

#[derive(Clone)]
pub struct AppState {
    pub config: InterviewConfig,
    pub store: Arc<dyn InterviewStore>,
    pub provider: Arc<dyn TextProvider>,
    pub interviews: Arc<InterviewService>,
    pub sessions: Arc<SessionService>,
    pub generation_rate_limiter: KeyedRateLimiter,
}

impl AppState {
    pub fn new(
        config: InterviewConfig,
        store: Arc<dyn InterviewStore>,
        provider: Arc<dyn TextProvider>,
    ) -> Self {
        let params = GenerationParams {
            temperature: Some(config.ai.temperature),
            max_tokens: Some(config.ai.max_output_tokens),
            json_output: false,
        };

        let interviews = Arc::new(InterviewService::new(
            store.clone(),
            provider.clone(),
            params.clone(),
        ));
        let sessions = Arc::new(SessionService::new(
            store.clone(),
            provider.clone(),
            params,
            config.sessions.context_window(),
        ));
        let generation_rate_limiter = create_keyed_rate_limiter(
            config.rate_limit.generation_per_minute,
            RATE_LIMIT_WINDOW_SECONDS,
        );

        Self {
            config,
            store,
            provider,
            interviews,
            sessions,
            generation_rate_limiter,
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_router(state: AppState) -> Router {
    // AI generation endpoints share a per-caller quota
    let rate_limited = || {
        from_fn_with_state(
            state.generation_rate_limiter.clone(),
            user_rate_limit_middleware,
        )
    };

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route(
            "/api/interviews",
            post(handlers::interviews::generate_interview)
                .layer(rate_limited())
                .get(handlers::interviews::list_interviews),
        )
        .route(
            "/api/interviews/:interview_id",
            get(handlers::interviews::get_interview).delete(handlers::interviews::delete_interview),
        )
        .route(
            "/api/interviews/:interview_id/feedback",
            post(handlers::feedback::submit_answers)
                .layer(rate_limited())
                .get(handlers::feedback::list_feedback),
        )
        .route(
            "/api/sessions",
            post(handlers::sessions::session_action).get(handlers::sessions::list_sessions),
        )
        .route("/api/sessions/:session_id", get(handlers::sessions::get_session))
        .route(
            "/api/sessions/:session_id/messages",
            get(handlers::sessions::list_messages),
        )
        .with_state(state.clone())
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config.security.allowed_origins))
}
