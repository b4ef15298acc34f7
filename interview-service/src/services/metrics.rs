//! Metrics collection for interview-service.
//!
//! Recorded through the `metrics` facade and rendered in Prometheus text
//! format at `/metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

const LATENCY_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

fn builder() -> PrometheusBuilder {
    let builder = PrometheusBuilder::new();
    match builder.set_buckets(LATENCY_BUCKETS) {
        Ok(builder) => builder,
        Err(e) => {
            tracing::warn!("Invalid histogram buckets, using summaries: {}", e);
            PrometheusBuilder::new()
        }
    }
}

/// Initialize metrics collection.
///
/// Safe to call more than once. When a global recorder is already installed
/// (several apps in one test binary), a detached handle is kept instead.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| match builder().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!("Prometheus recorder not installed: {}", e);
            builder().build_recorder().handle()
        }
    });
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record one call to the AI provider.
pub fn record_provider_call(provider: &str, purpose: &str, status: &str, elapsed: Duration) {
    metrics::counter!(
        "ai_provider_calls_total",
        "provider" => provider.to_string(),
        "purpose" => purpose.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "ai_provider_latency_seconds",
        "provider" => provider.to_string(),
        "purpose" => purpose.to_string()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_interview_generation(status: &'static str) {
    metrics::counter!("interview_generations_total", "status" => status).increment(1);
}

pub fn record_feedback_generation(status: &'static str) {
    metrics::counter!("feedback_generations_total", "status" => status).increment(1);
}

pub fn record_session_action(action: &'static str, status: &'static str) {
    metrics::counter!(
        "session_actions_total",
        "action" => action,
        "status" => status
    )
    .increment(1);
}
