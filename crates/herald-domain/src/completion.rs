//! Completion request parameters

use crate::PromptPayload;

/// A streaming chat-completion request
///
/// Temperature is always zero and streaming is always enabled; only the
/// model and the output bound vary between deployments.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "gpt-4o")
    pub model: String,

    /// Content of the single user-role message
    pub prompt: PromptPayload,

    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Whether the provider should stream deltas
    pub stream: bool,
}

impl CompletionRequest {
    /// Build a deterministic streaming request
    pub fn new(model: impl Into<String>, prompt: PromptPayload, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            prompt,
            max_tokens,
            temperature: 0.0,
            stream: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_generation_parameters() {
        let request = CompletionRequest::new("gpt-4o", PromptPayload::new("hi".into()), 512);
        assert_eq!(request.temperature, 0.0);
        assert!(request.stream);
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.prompt.as_str(), "hi");
    }
}
