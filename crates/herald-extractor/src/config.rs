//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How document failures affect the extraction as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPolicy {
    /// Any failing document aborts the extraction
    Strict,
    /// Failing documents are skipped while at least one succeeds
    #[default]
    BestEffort,
}

/// mdast node kinds that can be removed before flattening
///
/// Names follow mdast's `type` field (e.g. `mdxJsxFlowElement`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// `import` / `export` blocks
    MdxjsEsm,
    /// Block-level JSX components
    MdxJsxFlowElement,
    /// Inline JSX components
    MdxJsxTextElement,
    /// Block-level `{expression}`
    MdxFlowExpression,
    /// Inline `{expression}`
    MdxTextExpression,
    /// YAML front matter
    Yaml,
    /// TOML front matter
    Toml,
    /// Raw HTML
    Html,
    /// Fenced code blocks
    Code,
    /// Inline code spans
    InlineCode,
    /// Math blocks
    Math,
    /// Inline math
    InlineMath,
    /// Images (their alt text would otherwise be kept)
    Image,
    /// Link reference definitions
    Definition,
    /// Footnote definitions
    FootnoteDefinition,
}

impl NodeKind {
    /// The embedded code, expression and component kinds of MDX
    pub const MDX: [NodeKind; 5] = [
        NodeKind::MdxjsEsm,
        NodeKind::MdxJsxFlowElement,
        NodeKind::MdxJsxTextElement,
        NodeKind::MdxFlowExpression,
        NodeKind::MdxTextExpression,
    ];
}

/// Configuration for the Extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Ordered document identifiers making up the corpus
    pub documents: Vec<String>,

    /// Failure policy
    #[serde(default)]
    pub policy: ExtractionPolicy,

    /// Node kinds removed before flattening
    #[serde(default = "default_non_prose")]
    pub non_prose: BTreeSet<NodeKind>,
}

fn default_non_prose() -> BTreeSet<NodeKind> {
    NodeKind::MDX
        .into_iter()
        .chain([NodeKind::Yaml, NodeKind::Toml])
        .collect()
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.documents.is_empty() {
            return Err("documents must name at least one document".to_string());
        }
        if self.documents.iter().any(|d| d.trim().is_empty()) {
            return Err("document identifiers must not be blank".to_string());
        }
        let unique: BTreeSet<&String> = self.documents.iter().collect();
        if unique.len() != self.documents.len() {
            return Err("document identifiers must be unique".to_string());
        }
        Ok(())
    }

    /// Strict preset: any document failure is fatal
    pub fn strict() -> Self {
        Self {
            policy: ExtractionPolicy::Strict,
            ..Self::default()
        }
    }

    /// Best-effort preset: partial corpora are accepted
    pub fn best_effort() -> Self {
        Self {
            policy: ExtractionPolicy::BestEffort,
            ..Self::default()
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

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            documents: vec![
                "DavidYoonResume.mdx".to_string(),
                "KnowledgeCollection.mdx".to_string(),
            ],
            policy: ExtractionPolicy::BestEffort,
            non_prose: default_non_prose(),
        }
    }
}
