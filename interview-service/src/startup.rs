//! Application startup and lifecycle management.

use crate::config::{AiProviderKind, Environment, InterviewConfig, StoreBackend};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::mock::MockTextProvider;
use crate::services::{InterviewStore, MemoryStore, MongoStore, TextProvider};
use crate::{build_router, AppState};
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

async fn build_store(config: &InterviewConfig) -> Result<Arc<dyn InterviewStore>, AppError> {
    match config.store.backend {
        StoreBackend::MongoDb => {
            let store = MongoStore::connect(&config.mongodb.uri, &config.mongodb.database)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;

            store.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;

            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn build_provider(config: &InterviewConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    match config.ai.provider {
        AiProviderKind::Mock => {
            tracing::info!("Mock AI provider selected");
            Ok(Arc::new(MockTextProvider::new(true)))
        }
        AiProviderKind::Gemini if config.ai.api_key.is_empty() => {
            if config.environment == Environment::Prod {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "GOOGLE_API_KEY is required when AI_PROVIDER=gemini"
                )));
            }
            tracing::warn!("GOOGLE_API_KEY not set, using mock AI provider");
            Ok(Arc::new(MockTextProvider::new(true)))
        }
        AiProviderKind::Gemini => {
            let provider = GeminiTextProvider::new(GeminiConfig {
                api_key: config.ai.api_key.clone(),
                model: config.ai.text_model.clone(),
                api_base: config.ai.api_base.clone(),
                timeout: config.ai.request_timeout(),
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

            tracing::info!(model = %config.ai.text_model, "Gemini text provider initialized");
            Ok(Arc::new(provider))
        }
    }
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: InterviewConfig) -> Result<Self, AppError> {
        let store = build_store(&config).await?;
        let provider = build_provider(&config)?;

        let state = AppState::new(config.clone(), store, provider);

        // Port 0 binds a random port for testing
        let addr: SocketAddr = format!("{}:{}", config.common.host, config.common.port)
            .parse()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "Invalid listen address {}:{}: {}",
                    config.common.host,
                    config.common.port,
                    e
                ))
            })?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            store = %config.store.backend,
            provider = state.provider.name(),
            "Interview service listening"
        );

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve requests until SIGINT or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
