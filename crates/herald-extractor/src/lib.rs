//! Herald Extractor
//!
//! Converts the MDX corpus into the grounding context the model answers from.
//!
//! # Overview
//!
//! Every request reads the whole corpus fresh. Each document is parsed into an
//! mdast syntax tree, nodes of the configured non-prose kinds (ESM, JSX
//! components, expressions, front matter) are removed, and the remaining tree
//! is flattened to plain text under a heading derived from the document name.
//!
//! # Architecture
//!
//! ```text
//! DocumentSource → MDX parse → prune non-prose → flatten → GroundingContext
//! ```
//!
//! # Failure Policies
//!
//! - **Strict**: the first failing document aborts the whole extraction
//! - **Best-effort**: failing documents are skipped and reported; extraction
//!   fails only when no document succeeds
//!
//! # Example Usage
//!
//! ```no_run
//! use herald_extractor::{Extractor, ExtractorConfig, FsDocumentSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = FsDocumentSource::new("pages/docs");
//! let extractor = Extractor::new(source, ExtractorConfig::default());
//!
//! let outcome = extractor.extract().await?;
//! println!("Loaded {}/{} documents", outcome.context.len(), outcome.attempted);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod markup;
mod source;
mod types;


pub use config::{ExtractionPolicy, ExtractorConfig, NodeKind};
pub use error::{ExtractorError, SourceError};
pub use extractor::Extractor;
pub use markup::{extract_text, MarkupError};
pub use source::{FsDocumentSource, InMemorySource};
pub use types::{DocumentFailure, ExtractionOutcome, FailureStage};
