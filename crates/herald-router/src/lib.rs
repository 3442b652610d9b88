//! Herald Router
//!
//! HTTP adapter for the answer pipeline.
//! Serves the streaming answer endpoint and a health check.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use herald_extractor::FsDocumentSource;
use herald_llm::{LlmError, OpenAiClient};
use herald_pipeline::Pipeline;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Router error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Provider client could not be built
    #[error("Provider client error: {0}")]
    Client(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the production pipeline from configuration
///
/// One provider client serves both moderation and completion.
pub fn build_pipeline(
    config: &ServerConfig,
) -> Result<Pipeline<FsDocumentSource, OpenAiClient, OpenAiClient>, RouterError> {
    let client = OpenAiClient::with_timeouts(
        config.openai.base_url.as_str(),
        config.api_key()?,
        Duration::from_secs(config.openai.connect_timeout_secs),
        Duration::from_secs(config.openai.moderation_timeout_secs),
    )?;
    let source = FsDocumentSource::new(config.documents_dir.clone());

    Ok(Pipeline::new(&config.pipeline, source, client.clone(), client))
}

/// Start the HTTP server
///
/// Validates configuration, builds the pipeline and serves until the
/// listener fails.
pub async fn start_server(config: ServerConfig) -> Result<(), RouterError> {
    config.validate()?;

    info!("Starting Herald");
    info!("Bind address: {}", config.bind_addr());
    info!("Answer route: {}", config.route);
    info!(
        "Corpus: {} documents from {} ({:?} policy)",
        config.pipeline.extraction.documents.len(),
        config.documents_dir.display(),
        config.pipeline.extraction.policy
    );
    info!("Model: {}", config.pipeline.completion.model);

    let state = AppState::new(build_pipeline(&config)?);
    let app = create_router(state, &config.route);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_pipeline() {
        let config = ServerConfig::default_test_config();
        let pipeline = build_pipeline(&config).unwrap();
        assert_eq!(pipeline.documents(), 2);
        assert_eq!(pipeline.completion().base_url(), "https://api.openai.com/v1");
    }

    #[test]
    fn test_build_pipeline_requires_key() {
        let mut config = ServerConfig::default_test_config();
        config.openai.api_key = None;
        assert!(matches!(
            build_pipeline(&config),
            Err(RouterError::Config(config::ConfigError::MissingField(_)))
        ));
    }
}
