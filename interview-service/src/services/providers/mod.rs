//! AI provider abstractions and implementations.
//!
//! Question generation, answer feedback and interviewer replies all go
//! through [`TextProvider`], so the Gemini backend can be swapped for the
//! scripted mock in local runs and tests.

pub mod gemini;
pub mod mock;

use super::metrics;
use async_trait::async_trait;
use service_core::error::AppError;
use std::time::Instant;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Label used for the `status` metric dimension.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::InvalidRequest(_) => "invalid_request",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => AppError::ServiceUnavailable(msg),
            ProviderError::ApiError(msg) => AppError::BadGateway(msg),
            ProviderError::InvalidRequest(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            ProviderError::RateLimited => AppError::TooManyRequests(
                "AI provider rate limit exceeded, try again later".to_string(),
                None,
            ),
            ProviderError::ContentFiltered => AppError::BadRequest(anyhow::anyhow!(
                "The AI provider declined to answer this request"
            )),
            ProviderError::NetworkError(msg) => AppError::BadGateway(msg),
        }
    }
}

/// What a generation request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    Questions,
    Feedback,
    InterviewerReply,
}

impl PromptPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptPurpose::Questions => "questions",
            PromptPurpose::Feedback => "feedback",
            PromptPurpose::InterviewerReply => "interviewer_reply",
        }
    }
}

impl std::fmt::Display for PromptPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation parameters for AI requests.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum output tokens.
    pub max_tokens: Option<i32>,

    /// Ask the model for a JSON document instead of prose.
    pub json_output: bool,
}

#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub purpose: PromptPurpose,
    pub system: Option<String>,
    pub prompt: String,
    pub params: GenerationParams,
}

/// Result of a provider response.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Error,
}

/// Trait for text/JSON generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Provider name for logs, metrics and health output.
    fn name(&self) -> &'static str;

    /// Model identifier recorded on generated documents.
    fn model(&self) -> &str;

    async fn generate(&self, request: &PromptRequest) -> Result<ProviderResponse, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Call the provider, recording latency and outcome metrics.
pub async fn generate_recorded(
    provider: &dyn TextProvider,
    request: &PromptRequest,
) -> Result<ProviderResponse, ProviderError> {
    let started = Instant::now();
    let result = provider.generate(request).await;
    let elapsed = started.elapsed();

    let status = match &result {
        Ok(_) => "success",
        Err(e) => e.label(),
    };
    metrics::record_provider_call(provider.name(), request.purpose.as_str(), status, elapsed);

    match &result {
        Ok(response) => tracing::info!(
            provider = provider.name(),
            model = provider.model(),
            purpose = %request.purpose,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = ?response.finish_reason,
            latency_ms = elapsed.as_millis() as u64,
            "AI provider call completed"
        ),
        Err(e) => tracing::warn!(
            provider = provider.name(),
            purpose = %request.purpose,
            latency_ms = elapsed.as_millis() as u64,
            error = %e,
            "AI provider call failed"
        ),
    }

    result
}
