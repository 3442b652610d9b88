//! Configuration file parsing for the server.
//!
//! Loads the bind address, the answer route, the document directory, the
//! provider connection and the pipeline settings from TOML.

use herald_llm::openai::{
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MODERATION_TIMEOUT_SECS,
};
use herald_pipeline::PipelineConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A field holds an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Provider connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiSettings {
    /// API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token; may instead come from the command line or environment
    #[serde(default)]
    pub api_key: Option<String>,

    /// TCP connect timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-call timeout for moderation
    #[serde(default = "default_moderation_timeout")]
    pub moderation_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_moderation_timeout() -> u64 {
    DEFAULT_MODERATION_TIMEOUT_SECS
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            connect_timeout_secs: default_connect_timeout(),
            moderation_timeout_secs: default_moderation_timeout(),
        }
    }
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 3000)
    pub bind_port: u16,

    /// Path of the answer endpoint
    #[serde(default = "default_route")]
    pub route: String,

    /// Directory the corpus documents are read from
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    /// Provider connection
    #[serde(default)]
    pub openai: OpenAiSettings,

    /// Extraction, persona and generation settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

fn default_route() -> String {
    "/api/vector-search".to_string()
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("pages/docs")
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check everything except the API key, which may be supplied later
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.route.starts_with('/') || self.route == "/health" {
            return Err(ConfigError::Invalid(format!(
                "route must be an absolute path other than /health, got {}",
                self.route
            )));
        }
        if self.openai.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("openai.base_url".to_string()));
        }
        self.pipeline.validate().map_err(ConfigError::Invalid)
    }

    /// The provider API key
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.openai
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("openai.api_key".to_string()))
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 3000,
            route: default_route(),
            documents_dir: default_documents_dir(),
            openai: OpenAiSettings {
                api_key: Some("test-key-do-not-use-in-production".to_string()),
                ..OpenAiSettings::default()
            },
            pipeline: PipelineConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_extractor::ExtractionPolicy;
    use herald_pipeline::AnswerStyle;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.route, "/api/vector-search");
        assert!(config.validate().is_ok());
        assert!(config.api_key().is_ok());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = ServerConfig::parse(
            r#"
            bind_address = "0.0.0.0"
            bind_port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.route, "/api/vector-search");
        assert_eq!(config.documents_dir, PathBuf::from("pages/docs"));
        assert_eq!(config.openai.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.pipeline.completion.model, "gpt-4o");
        assert!(matches!(
            config.api_key(),
            Err(ConfigError::MissingField(field)) if field == "openai.api_key"
        ));
    }

    #[test]
    fn test_parse_full_toml() {
        let config = ServerConfig::parse(
            r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            route = "/api/ask"
            documents_dir = "content"

            [openai]
            base_url = "http://localhost:8081/v1"
            api_key = "sk-test"
            moderation_timeout_secs = 5

            [pipeline.extraction]
            documents = ["Resume.mdx"]
            policy = "strict"

            [pipeline.prompt]
            subject_name = "Ada Lovelace"
            style = "two_sentences"

            [pipeline.completion]
            max_tokens = 128
            "#,
        )
        .unwrap();

        assert_eq!(config.route, "/api/ask");
        assert_eq!(config.api_key().unwrap(), "sk-test");
        assert_eq!(config.openai.moderation_timeout_secs, 5);
        assert_eq!(config.openai.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
        assert_eq!(config.pipeline.extraction.policy, ExtractionPolicy::Strict);
        assert_eq!(config.pipeline.prompt.style, AnswerStyle::TwoSentences);
        assert_eq!(config.pipeline.completion.max_tokens, 128);
    }

    #[test]
    fn test_rejects_bad_route() {
        let result = ServerConfig::parse(
            r#"
            bind_address = "0.0.0.0"
            bind_port = 8080
            route = "api"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_invalid_pipeline() {
        let result = ServerConfig::parse(
            r#"
            bind_address = "0.0.0.0"
            bind_port = 8080

            [pipeline.completion]
            max_tokens = 0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let mut config = ServerConfig::default_test_config();
        config.openai.api_key = Some("  ".to_string());
        assert!(config.api_key().is_err());
    }
}
