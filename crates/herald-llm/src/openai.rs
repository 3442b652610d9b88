//! OpenAI-compatible Provider Implementation
//!
//! Moderation (`POST /moderations`) and streaming chat completions
//! (`POST /chat/completions` with `stream: true`) over HTTPS.
//!
//! # Features
//!
//! - Async HTTP communication with any OpenAI-compatible endpoint
//! - Incremental SSE decoding, one delta handed out per read
//! - Pull-based body reads, so the provider is never read ahead of the consumer
//! - No retries: every call is made at most once
//!
//! # Examples
//!
//! ```no_run
//! use herald_llm::OpenAiClient;
//!
//! let client = OpenAiClient::new("https://api.openai.com/v1", "sk-...").unwrap();
//! ```

use crate::sse::{SseDecoder, SseEvent};
use crate::LlmError;
use herald_domain::traits::{CompletionService, DeltaStream, ModerationService};
use herald_domain::{CompletionRequest, ModerationVerdict, StreamChunk};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;
use tracing::{debug, warn};

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default TCP connect timeout (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default timeout for a whole moderation call (30 seconds)
pub const DEFAULT_MODERATION_TIMEOUT_SECS: u64 = 30;

/// Client for an OpenAI-compatible API
///
/// Completion calls carry no overall timeout because slow generations are
/// expected to keep streaming for a long time.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    moderation_timeout: Duration,
}

/// Request body for the moderation API
#[derive(Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
}

/// Response from the moderation API
#[derive(Deserialize)]
struct ModerationResponse {
    #[serde(default)]
    results: Vec<ModerationResult>,
}

#[derive(Deserialize)]
struct ModerationResult {
    flagged: bool,
    #[serde(default)]
    categories: BTreeMap<String, bool>,
    #[serde(default)]
    category_scores: BTreeMap<String, f64>,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// One streamed chat completion chunk
#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    delta: ChatDelta,
}

#[derive(Deserialize, Default)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Error envelope used by the API for failed requests
#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiClient {
    /// Create a new client with default timeouts
    ///
    /// # Parameters
    ///
    /// - `base_url`: API root (e.g., "https://api.openai.com/v1")
    /// - `api_key`: Bearer token sent with every request
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeouts(
            base_url,
            api_key,
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_MODERATION_TIMEOUT_SECS),
        )
    }

    /// Create a new client with explicit timeouts
    pub fn with_timeouts(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        connect_timeout: Duration,
        moderation_timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
            moderation_timeout,
        })
    }

    /// The API root requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Map a non-success response to an error, reading the provider's message
async fn rejection(response: reqwest::Response, model: Option<&str>) -> LlmError {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return LlmError::RateLimitExceeded;
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    match model {
        Some(model) if status == reqwest::StatusCode::NOT_FOUND => {
            LlmError::ModelNotAvailable(model.to_string())
        }
        _ => LlmError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

impl ModerationService for OpenAiClient {
    type Error = LlmError;

    async fn moderate(&self, input: &str) -> Result<Vec<ModerationVerdict>, Self::Error> {
        debug!(input_len = input.len(), "Submitting moderation request");

        let response = self
            .client
            .post(self.endpoint("moderations"))
            .bearer_auth(&self.api_key)
            .timeout(self.moderation_timeout)
            .json(&ModerationRequest { input })
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Moderation request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(rejection(response, None).await);
        }

        let parsed: ModerationResponse = response.json().await.map_err(|e| {
            LlmError::InvalidResponse(format!("Failed to parse moderation response: {}", e))
        })?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| ModerationVerdict {
                flagged: r.flagged,
                categories: r.categories,
                category_scores: r.category_scores,
            })
            .collect())
    }
}

impl CompletionService for OpenAiClient {
    type Error = LlmError;
    type Stream = OpenAiDeltaStream;

    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<Self::Stream, Self::Error> {
        let body = ChatRequest {
            model: &request.model,
            messages: [ChatMessage {
                role: "user",
                content: request.prompt.as_str(),
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: request.stream,
        };

        debug!(
            model = %request.model,
            prompt_len = request.prompt.len(),
            max_tokens = request.max_tokens,
            "Submitting completion request"
        );

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(rejection(response, Some(request.model.as_str())).await);
        }

        Ok(OpenAiDeltaStream::new(response))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Reading,
    /// Body ended without the end marker
    Truncated,
    Finished,
}

/// Deltas of one streaming chat completion
///
/// Dropping the stream drops the underlying response and releases its
/// connection.
#[derive(Debug)]
pub struct OpenAiDeltaStream {
    response: reqwest::Response,
    decoder: SseDecoder,
    pending: VecDeque<StreamChunk>,
    state: StreamState,
}

impl OpenAiDeltaStream {
    fn new(response: reqwest::Response) -> Self {
        Self {
            response,
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            state: StreamState::Reading,
        }
    }

    fn absorb(&mut self, events: Vec<SseEvent>) -> Result<(), LlmError> {
        for event in events {
            match event {
                SseEvent::Done => {
                    self.state = StreamState::Finished;
                    return Ok(());
                }
                SseEvent::Data(payload) => {
                    let chunk: ChatChunk = serde_json::from_str(&payload).map_err(|e| {
                        LlmError::InvalidResponse(format!("Malformed stream chunk: {}", e))
                    })?;

                    if let Some(error) = chunk.error {
                        return Err(LlmError::InvalidResponse(format!(
                            "Provider error mid-stream: {}",
                            error.message
                        )));
                    }

                    let text = chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content)
                        .unwrap_or_default();
                    self.pending.push_back(StreamChunk::new(text));
                }
            }
        }
        Ok(())
    }

    fn fail(&mut self, error: LlmError) -> Option<Result<StreamChunk, LlmError>> {
        warn!("Completion stream failed: {}", error);
        self.state = StreamState::Finished;
        self.pending.clear();
        Some(Err(error))
    }
}

impl DeltaStream for OpenAiDeltaStream {
    type Error = LlmError;

    async fn next_delta(&mut self) -> Option<Result<StreamChunk, Self::Error>> {
        loop {
            if let Some(chunk) = self.pending.pop_front() {
                return Some(Ok(chunk));
            }

            match self.state {
                StreamState::Finished => return None,
                StreamState::Truncated => {
                    return self.fail(LlmError::InvalidResponse(
                        "Completion stream ended without [DONE]".to_string(),
                    ));
                }
                StreamState::Reading => {}
            }

            let (events, at_eof) = match self.response.chunk().await {
                Ok(Some(bytes)) => (self.decoder.push(&bytes), false),
                Ok(None) => (self.decoder.finish(), true),
                Err(e) => {
                    return self.fail(LlmError::Communication(format!(
                        "Stream read failed: {}",
                        e
                    )));
                }
            };

            if let Err(e) = events.and_then(|events| self.absorb(events)) {
                return self.fail(e);
            }

            if at_eof && self.state == StreamState::Reading {
                self.state = StreamState::Truncated;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenAiClient::new("https://api.example.com/v1/", "key").unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/v1");
        assert_eq!(
            client.endpoint("moderations"),
            "https://api.example.com/v1/moderations"
        );
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = OpenAiClient::new(DEFAULT_BASE_URL, "  ");
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_chat_request_shape() {
        let body = ChatRequest {
            model: "gpt-4o",
            messages: [ChatMessage {
                role: "user",
                content: "prompt",
            }],
            max_tokens: 512,
            temperature: 0.0,
            stream: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "prompt");
        assert_eq!(json["max_tokens"], 512);
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn test_chunk_without_content_is_empty_delta() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#)
                .unwrap();
        assert!(chunk.choices[0].delta.content.is_none());

        let chunk: ChatChunk = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(chunk.choices.is_empty());
    }
}
