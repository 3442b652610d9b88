//! Completion Streamer: provider deltas in, wire frames out

use crate::config::GenerationConfig;
use crate::sink::FrameSink;
use crate::wire::encode_frame;
use herald_domain::traits::{CompletionService, DeltaStream};
use herald_domain::{CompletionRequest, PromptPayload};
use tracing::{debug, error, info, warn};

/// How a stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The provider signalled the end of the answer
    Completed,
    /// A read failed after the stream was opened; frames already sent stay sent
    ProviderFailed(String),
    /// The caller went away
    Cancelled,
}

/// Summary of one streamed answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    /// Frames written and flushed
    pub frames_sent: usize,
    /// Zero-length deltas skipped
    pub empty_deltas: usize,
    /// Why the stream ended
    pub termination: Termination,
}

impl StreamOutcome {
    /// Whether the whole answer was delivered
    pub fn is_complete(&self) -> bool {
        self.termination == Termination::Completed
    }
}

/// Opens completion streams with fixed generation parameters
pub struct CompletionStreamer<C> {
    completion: C,
    generation: GenerationConfig,
}

impl<C> CompletionStreamer<C>
where
    C: CompletionService,
{
    /// Create a streamer for the given provider
    pub fn new(completion: C, generation: GenerationConfig) -> Self {
        Self {
            completion,
            generation,
        }
    }

    /// The underlying provider
    pub fn completion(&self) -> &C {
        &self.completion
    }

    /// Issue the request and wait for the provider to accept it
    ///
    /// Nothing has been sent to the caller when this fails.
    pub async fn open(&self, prompt: PromptPayload) -> Result<C::Stream, C::Error> {
        let request = CompletionRequest::new(
            self.generation.model.clone(),
            prompt,
            self.generation.max_tokens,
        );
        debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            prompt_chars = request.prompt.len(),
            "Opening completion stream"
        );
        self.completion.stream_completion(request).await
    }
}

/// Forward every delta of `stream` into `sink`
///
/// Each non-empty delta is encoded, written and flushed before the next one
/// is read, so a slow caller slows the provider read down. A disconnect seen
/// while waiting for the provider stops the read and drops the stream. The
/// sink is finished exactly once whatever the termination.
pub async fn pump<S, K>(mut stream: S, sink: &mut K) -> StreamOutcome
where
    S: DeltaStream,
    K: FrameSink,
{
    let mut frames_sent = 0;
    let mut empty_deltas = 0;

    let termination = loop {
        let next = tokio::select! {
            biased;
            _ = sink.closed() => None,
            item = stream.next_delta() => Some(item),
        };

        let Some(item) = next else {
            break Termination::Cancelled;
        };

        match item {
            None => break Termination::Completed,
            Some(Err(e)) => {
                error!(error = %e, frames_sent, "Completion stream failed");
                break Termination::ProviderFailed(e.to_string());
            }
            Some(Ok(chunk)) => {
                let Some(frame) = encode_frame(chunk.text()) else {
                    empty_deltas += 1;
                    continue;
                };
                if sink.write_frame(frame).await.is_err() || sink.flush().await.is_err() {
                    break Termination::Cancelled;
                }
                frames_sent += 1;
            }
        }
    };

    drop(stream);
    sink.finish();

    match &termination {
        Termination::Completed => info!(frames_sent, empty_deltas, "Answer streamed"),
        Termination::Cancelled => warn!(frames_sent, "Caller disconnected, stream cancelled"),
        Termination::ProviderFailed(_) => {}
    }

    StreamOutcome {
        frames_sent,
        empty_deltas,
        termination,
    }
}
