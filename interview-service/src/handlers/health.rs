use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe: the service is up and its store answers.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": state.config.service_name,
                "version": env!("CARGO_PKG_VERSION"),
                "store": state.store.backend(),
                "provider": state.provider.name(),
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": state.config.service_name,
                "store": state.store.backend(),
                "error": e.to_string(),
            })),
        ),
    }
}

/// Readiness probe: the store and the AI provider are both usable.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if let Err(e) = state.store.health_check().await {
        tracing::warn!(error = %e, "Store not ready");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    if let Err(e) = state.provider.health_check().await {
        tracing::warn!(error = %e, "AI provider not ready");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}
