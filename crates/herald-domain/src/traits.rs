//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the request pipeline and the
//! services it calls. Implementations live in other crates.

use crate::{CompletionRequest, Document, DocumentId, ModerationVerdict, StreamChunk};
use std::fmt::Display;
use std::future::Future;

/// Source of raw documents
///
/// Implemented by the infrastructure layer (herald-extractor)
pub trait DocumentSource: Send + Sync {
    /// Error type for fetch operations
    type Error: Display + Send;

    /// Fetch the raw markup of one document
    fn fetch(&self, id: &DocumentId) -> impl Future<Output = Result<Document, Self::Error>> + Send;
}

/// Safety classifier for caller input
///
/// Implemented by the infrastructure layer (herald-llm)
pub trait ModerationService: Send + Sync {
    /// Error type for moderation calls
    type Error: Display + Send;

    /// Classify the input, returning the raw list of verdicts
    fn moderate(
        &self,
        input: &str,
    ) -> impl Future<Output = Result<Vec<ModerationVerdict>, Self::Error>> + Send;
}

/// Incremental sequence of completion deltas
///
/// `None` marks the provider's explicit end signal. After an error or `None`
/// the stream must not be polled again.
pub trait DeltaStream: Send {
    /// Error type for read failures
    type Error: Display + Send;

    /// Wait for the next delta
    fn next_delta(
        &mut self,
    ) -> impl Future<Output = Option<Result<StreamChunk, Self::Error>>> + Send;
}

/// Streaming chat-completion provider
///
/// Implemented by the infrastructure layer (herald-llm)
pub trait CompletionService: Send + Sync {
    /// Error type for rejected requests
    type Error: Display + Send;

    /// Stream produced by an accepted request
    type Stream: DeltaStream + 'static;

    /// Issue the request; resolves once the provider has accepted it
    fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send;
}
