//! Types for extraction results

use herald_domain::{DocumentId, GroundingContext};
use std::fmt;

/// Stage at which a document failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// The document source could not provide it
    Fetch,
    /// The markup could not be parsed
    Parse,
    /// No prose remained after filtering
    Content,
}

impl FailureStage {
    /// Stage name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Fetch => "fetch",
            FailureStage::Parse => "parse",
            FailureStage::Content => "content",
        }
    }
}

/// A document that contributed nothing to the context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    /// Failed document
    pub id: DocumentId,
    /// Where it failed
    pub stage: FailureStage,
    /// Human-readable cause
    pub reason: String,
}

impl DocumentFailure {
    /// Create a new failure record
    pub fn new(id: DocumentId, stage: FailureStage, reason: impl Into<String>) -> Self {
        Self {
            id,
            stage,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to read {}: {}", self.id, self.reason)
    }
}

/// Result of a successful extraction
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Context built from every document that succeeded
    pub context: GroundingContext,

    /// Documents skipped under the best-effort policy
    pub failures: Vec<DocumentFailure>,

    /// Number of documents attempted
    pub attempted: usize,
}

impl ExtractionOutcome {
    /// Whether some documents were skipped
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}
