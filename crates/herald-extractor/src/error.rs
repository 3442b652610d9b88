//! Error types for the Extractor

use crate::types::DocumentFailure;
use herald_domain::DocumentId;
use thiserror::Error;

/// Errors that end an extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// A document failed under the strict policy
    #[error("{0}")]
    Document(DocumentFailure),

    /// Every document failed under the best-effort policy
    #[error("Failed to read any documents. Errors: {}", summarize(.0))]
    AllFailed(Vec<DocumentFailure>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Every document failure carried by this error
    pub fn failures(&self) -> &[DocumentFailure] {
        match self {
            ExtractorError::Document(failure) => std::slice::from_ref(failure),
            ExtractorError::AllFailed(failures) => failures,
            ExtractorError::Config(_) => &[],
        }
    }
}

fn summarize(failures: &[DocumentFailure]) -> String {
    if failures.is_empty() {
        return "no documents configured".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by document sources
#[derive(Error, Debug)]
pub enum SourceError {
    /// No document with this identifier
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    /// Identifier escapes the source root or is otherwise unusable
    #[error("Invalid document identifier: {0}")]
    InvalidId(DocumentId),

    /// I/O failure while reading
    #[error("Failed to read {id}: {source}")]
    Read {
        /// Document being read
        id: DocumentId,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureStage;

    #[test]
    fn test_all_failed_message_lists_documents() {
        let error = ExtractorError::AllFailed(vec![
            DocumentFailure::new(DocumentId::new("a.mdx"), FailureStage::Fetch, "missing"),
            DocumentFailure::new(DocumentId::new("b.mdx"), FailureStage::Content, "empty"),
        ]);
        let message = error.to_string();
        assert!(message.starts_with("Failed to read any documents."));
        assert!(message.contains("a.mdx"));
        assert!(message.contains("b.mdx"));
        assert_eq!(error.failures().len(), 2);
    }

    #[test]
    fn test_document_error_exposes_failure() {
        let failure = DocumentFailure::new(DocumentId::new("a.mdx"), FailureStage::Parse, "bad");
        let error = ExtractorError::Document(failure);
        assert_eq!(error.failures()[0].id.as_str(), "a.mdx");
    }
}
