use serde::Deserialize;
use service_core::config::{self as core_config, get_env, parse_env};
use service_core::error::AppError;
use std::env;
use std::time::Duration;

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_OUTPUT_TOKENS: i32 = 2048;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_AI_CONTEXT_MESSAGES: usize = 20;
const DEFAULT_GENERATION_RATE_LIMIT: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct InterviewConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub service_name: String,
    pub environment: Environment,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub mongodb: MongoConfig,
    pub store: StoreConfig,
    pub ai: AiConfig,
    pub sessions: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::MongoDb => write!(f, "mongodb"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProviderKind {
    Gemini,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub provider: AiProviderKind,
    pub api_key: String,
    /// Model for question, feedback and interviewer generation (e.g., gemini-2.0-flash)
    pub text_model: String,
    pub api_base: String,
    pub temperature: f32,
    pub max_output_tokens: i32,
    pub request_timeout_secs: u64,
}

impl AiConfig {
    /// Provider call timeout; never zero.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Number of recent messages sent as context for AI interviewer replies.
    pub ai_context_messages: usize,
}

impl SessionConfig {
    /// Context window for interviewer replies; always includes the latest message.
    pub fn context_window(&self) -> usize {
        self.ai_context_messages.max(1)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// AI generation requests allowed per caller per minute.
    pub generation_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl InterviewConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = core_config::is_production();

        let backend = match get_env("STORE_BACKEND", Some("mongodb"), is_prod)?
            .to_lowercase()
            .as_str()
        {
            "mongodb" | "mongo" => StoreBackend::MongoDb,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Invalid STORE_BACKEND: {}. Must be one of: mongodb, memory",
                    other
                )))
            }
        };

        let provider = match get_env("AI_PROVIDER", Some("gemini"), is_prod)?
            .to_lowercase()
            .as_str()
        {
            "gemini" => AiProviderKind::Gemini,
            "mock" => AiProviderKind::Mock,
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Invalid AI_PROVIDER: {}. Must be one of: gemini, mock",
                    other
                )))
            }
        };

        let allowed_origins = get_env(
            "ALLOWED_ORIGINS",
            Some("http://localhost:3000"),
            is_prod,
        )?
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();

        Ok(InterviewConfig {
            common: common_config,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "interview-service".to_string()),
            environment: if is_prod {
                Environment::Prod
            } else {
                Environment::Dev
            },
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("interview_db"), is_prod)?,
            },
            store: StoreConfig { backend },
            ai: AiConfig {
                provider,
                // An empty key is allowed outside production; startup falls
                // back to the mock provider.
                api_key: get_env("GOOGLE_API_KEY", Some(""), is_prod)?,
                text_model: get_env("GENAI_TEXT_MODEL", Some("gemini-2.0-flash"), is_prod)?,
                api_base: get_env(
                    "GEMINI_API_BASE",
                    Some("https://generativelanguage.googleapis.com/v1beta"),
                    is_prod,
                )?,
                temperature: parse_env("GENAI_TEMPERATURE", DEFAULT_TEMPERATURE),
                max_output_tokens: parse_env("GENAI_MAX_OUTPUT_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS),
                request_timeout_secs: parse_env(
                    "GENAI_REQUEST_TIMEOUT_SECS",
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                )
                .max(1),
            },
            sessions: SessionConfig {
                ai_context_messages: parse_env(
                    "SESSION_AI_CONTEXT_MESSAGES",
                    DEFAULT_AI_CONTEXT_MESSAGES,
                )
                .max(1),
            },
            rate_limit: RateLimitConfig {
                generation_per_minute: parse_env(
                    "GENERATION_RATE_LIMIT_PER_MINUTE",
                    DEFAULT_GENERATION_RATE_LIMIT,
                ),
            },
            security: SecurityConfig { allowed_origins },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_windows_are_raised_to_one() {
        let sessions = SessionConfig {
            ai_context_messages: 0,
        };
        assert_eq!(sessions.context_window(), 1);

        let ai = AiConfig {
            provider: AiProviderKind::Gemini,
            api_key: "key".to_string(),
            text_model: "gemini-2.0-flash".to_string(),
            api_base: "https://example.test".to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            request_timeout_secs: 0,
        };
        assert_eq!(ai.request_timeout(), Duration::from_secs(1));
    }
}
