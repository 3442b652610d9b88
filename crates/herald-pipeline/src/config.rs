//! Configuration for the Pipeline

use crate::prompt::{AnswerStyle, PromptConfig};
use herald_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};

/// Completion parameters that vary between deployments
///
/// Temperature is not configurable; requests are always deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound on generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Configuration for the whole request pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Corpus and failure policy
    #[serde(default)]
    pub extraction: ExtractorConfig,

    /// Persona and answer style
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Model parameters
    #[serde(default)]
    pub completion: GenerationConfig,
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.extraction.validate()?;
        if self.prompt.subject_name.trim().is_empty() {
            return Err("prompt.subject_name must not be empty".to_string());
        }
        if self.completion.model.trim().is_empty() {
            return Err("completion.model must not be empty".to_string());
        }
        if self.completion.max_tokens == 0 {
            return Err("completion.max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Strict preset: any document failure is fatal, answers are two sentences
    pub fn strict() -> Self {
        Self {
            extraction: ExtractorConfig::strict(),
            prompt: PromptConfig {
                style: AnswerStyle::TwoSentences,
                ..PromptConfig::default()
            },
            completion: GenerationConfig::default(),
        }
    }

    /// Best-effort preset: partial corpora are accepted, answers are unconstrained
    pub fn best_effort() -> Self {
        Self {
            extraction: ExtractorConfig::best_effort(),
            prompt: PromptConfig {
                style: AnswerStyle::Detailed,
                ..PromptConfig::default()
            },
            completion: GenerationConfig::default(),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
