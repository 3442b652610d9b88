//! Prompt payload - the single string sent to the completion model

/// Immutable prompt built from persona, grounding context and query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload(String);

impl PromptPayload {
    /// Wrap an assembled prompt
    pub fn new(prompt: String) -> Self {
        Self(prompt)
    }

    /// The prompt text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the prompt is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
