//! Herald Pipeline
//!
//! The request pipeline that answers one question about one person.
//!
//! # Architecture
//!
//! ```text
//!            ┌─ SafetyGate ─┐
//! request ──►┤              ├──► PromptAssembler ──► CompletionStreamer ──► FrameSink
//!            └─ Extractor ──┘
//! ```
//!
//! Moderation and extraction run concurrently; neither depends on the other.
//! Every failure before the first frame becomes a [`PipelineError`] that the
//! caller can render as a structured body. Failures after streaming has
//! begun only truncate the stream and are logged.
//!
//! # Example Usage
//!
//! ```no_run
//! use herald_extractor::InMemorySource;
//! use herald_llm::{MockCompletion, MockModeration};
//! use herald_pipeline::{Pipeline, PipelineConfig, RecordingSink};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = InMemorySource::new().with_document("DavidYoonResume.mdx", "# Resume");
//! let pipeline = Pipeline::new(
//!     &PipelineConfig::default(),
//!     source,
//!     MockModeration::clean(),
//!     MockCompletion::new(["He led ", "InfoSec and IT."]),
//! );
//!
//! let mut sink = RecordingSink::new();
//! let outcome = pipeline
//!     .answer(br#"{"prompt":"What did David do at Ledn?"}"#, &mut sink)
//!     .await?;
//! println!("{} frames sent", outcome.frames_sent);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;
mod prompt;
mod sink;
mod streamer;
pub mod wire;

pub use config::{GenerationConfig, PipelineConfig};
pub use error::{ErrorBody, FaultKind, PipelineError, GENERIC_ERROR_MESSAGE};
pub use pipeline::{Pipeline, PreparedAnswer};
pub use prompt::{AnswerStyle, PromptAssembler, PromptConfig};
pub use sink::{FrameSink, RecordingSink, SinkError, SinkEvent};
pub use streamer::{pump, CompletionStreamer, StreamOutcome, Termination};
