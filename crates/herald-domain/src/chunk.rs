//! Stream chunks - incremental units of model output

/// One incremental delta of generated text (possibly empty)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamChunk(String);

impl StreamChunk {
    /// Create a chunk from delta text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The delta text
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Whether the delta carries no text
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for StreamChunk {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for StreamChunk {
    fn from(text: String) -> Self {
        Self(text)
    }
}
