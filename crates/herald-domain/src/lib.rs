//! Herald Domain Layer
//!
//! This crate contains the request-scoped value types and the service
//! boundaries of Herald. It has ZERO external dependencies and defines the
//! concepts every other layer builds upon.
//!
//! ## Key Concepts
//!
//! - **Document**: raw MDX text fetched fresh from a document source
//! - **Grounding Context**: labeled plain-text sections the answer must stay within
//! - **Query**: the caller's trimmed, non-empty question
//! - **Moderation Verdict**: flagged status plus category breakdown
//! - **Prompt Payload**: the immutable prompt sent to the completion model
//! - **Stream Chunk**: one incremental delta of model output
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Nothing here is persisted; every value lives for one request
//! - Trait definitions for the document source, moderation and completion services

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod completion;
pub mod context;
pub mod document;
pub mod moderation;
pub mod prompt;
pub mod query;
pub mod traits;

// Re-exports for convenience
pub use chunk::StreamChunk;
pub use completion::CompletionRequest;
pub use context::{ContextSection, GroundingContext, SECTION_SEPARATOR};
pub use document::{Document, DocumentId};
pub use moderation::ModerationVerdict;
pub use prompt::PromptPayload;
pub use query::{Query, QueryError};
