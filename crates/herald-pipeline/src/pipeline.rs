//! Request orchestration

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::prompt::PromptAssembler;
use crate::sink::FrameSink;
use crate::streamer::{pump, CompletionStreamer, StreamOutcome};
use herald_domain::traits::{CompletionService, DeltaStream, DocumentSource, ModerationService};
use herald_domain::Query;
use herald_extractor::Extractor;
use herald_gatekeeper::SafetyGate;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    #[serde(default)]
    prompt: Option<String>,
}

/// Parse the request body into a query
fn parse_body(body: &[u8]) -> Result<Query, PipelineError> {
    let request: AnswerRequest =
        serde_json::from_slice(body).map_err(|e| PipelineError::InvalidBody(e.to_string()))?;
    let raw = request.prompt.unwrap_or_default();
    Ok(Query::parse(&raw)?)
}

/// The request pipeline
///
/// Holds no per-request state; one instance serves every request.
pub struct Pipeline<D, M, C>
where
    D: DocumentSource,
    M: ModerationService,
    C: CompletionService,
{
    extractor: Extractor<D>,
    gate: SafetyGate<M>,
    assembler: PromptAssembler,
    streamer: CompletionStreamer<C>,
    documents: usize,
}

impl<D, M, C> Pipeline<D, M, C>
where
    D: DocumentSource,
    M: ModerationService,
    C: CompletionService,
{
    /// Wire the pipeline from configuration and its three services
    pub fn new(config: &PipelineConfig, source: D, moderation: M, completion: C) -> Self {
        Self {
            extractor: Extractor::new(source, config.extraction.clone()),
            gate: SafetyGate::new(moderation),
            assembler: PromptAssembler::new(&config.prompt),
            streamer: CompletionStreamer::new(completion, config.completion.clone()),
            documents: config.extraction.documents.len(),
        }
    }

    /// The document source
    pub fn source(&self) -> &D {
        self.extractor.source()
    }

    /// The moderation service
    pub fn moderation(&self) -> &M {
        self.gate.moderation()
    }

    /// The completion provider
    pub fn completion(&self) -> &C {
        self.streamer.completion()
    }

    /// Number of configured corpus documents
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Run every step that can still fail with a structured error
    ///
    /// Validates the body, then screens the query and builds the grounding
    /// context concurrently. Generation is only requested once both have
    /// succeeded and the query was cleared. The returned answer has an open
    /// provider stream but nothing has been sent to the caller yet.
    pub async fn prepare(&self, body: &[u8]) -> Result<PreparedAnswer<C::Stream>, PipelineError> {
        let query = parse_body(body)?;
        debug!(query_chars = query.as_str().len(), "Query accepted");

        let (gate, extraction) = tokio::join!(self.gate.check(&query), self.extractor.extract());

        let gate = gate?;
        if !gate.is_cleared() {
            return Err(PipelineError::Flagged {
                categories: gate.verdict.categories,
            });
        }
        let extraction = extraction?;

        let prompt = self.assembler.assemble(&extraction.context, &query);
        let stream = self
            .streamer
            .open(prompt)
            .await
            .map_err(|e| PipelineError::Completion(e.to_string()))?;

        info!(
            documents = extraction.context.len(),
            partial = extraction.is_partial(),
            "Streaming answer"
        );
        Ok(PreparedAnswer { stream })
    }

    /// Prepare and stream one answer into `sink`
    pub async fn answer<K>(&self, body: &[u8], sink: &mut K) -> Result<StreamOutcome, PipelineError>
    where
        K: FrameSink,
    {
        let prepared = self.prepare(body).await?;
        Ok(prepared.stream_to(sink).await)
    }
}

/// An answer whose provider stream is open but not yet forwarded
pub struct PreparedAnswer<S> {
    stream: S,
}

impl<S> PreparedAnswer<S>
where
    S: DeltaStream,
{
    /// Forward the answer into a borrowed sink
    pub async fn stream_to<K>(self, sink: &mut K) -> StreamOutcome
    where
        K: FrameSink,
    {
        pump(self.stream, sink).await
    }

    /// Forward the answer into an owned sink, for use in a spawned task
    pub async fn stream_into<K>(self, mut sink: K) -> StreamOutcome
    where
        K: FrameSink,
    {
        pump(self.stream, &mut sink).await
    }
}
