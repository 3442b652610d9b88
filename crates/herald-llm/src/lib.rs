//! Herald LLM Provider Layer
//!
//! Implementations of the `ModerationService` and `CompletionService` traits
//! from `herald-domain`.
//!
//! # Providers
//!
//! - `MockModeration` / `MockCompletion`: Deterministic mocks for testing
//! - `OpenAiClient`: OpenAI-compatible moderation and streaming chat completions
//!
//! # Examples
//!
//! ```
//! use herald_domain::traits::{CompletionService, DeltaStream};
//! use herald_domain::{CompletionRequest, PromptPayload};
//! use herald_llm::MockCompletion;
//!
//! # async fn example() {
//! let provider = MockCompletion::new(["Hello ", "from LLM!"]);
//! let request = CompletionRequest::new("mock", PromptPayload::new("hi".into()), 16);
//! let mut stream = provider.stream_completion(request).await.unwrap();
//! let first = stream.next_delta().await.unwrap().unwrap();
//! assert_eq!(first.text(), "Hello ");
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;
mod sse;

use herald_domain::traits::{CompletionService, DeltaStream, ModerationService};
use herald_domain::{CompletionRequest, ModerationVerdict, StreamChunk};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use openai::{OpenAiClient, OpenAiDeltaStream};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider refused the request
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status returned by the provider
        status: u16,
        /// Provider's error message
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Mock moderation service returning a fixed verdict list
///
/// # Examples
///
/// ```
/// use herald_llm::MockModeration;
///
/// let moderation = MockModeration::flagged(["violence"]);
/// assert_eq!(moderation.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockModeration {
    verdicts: Vec<ModerationVerdict>,
    fail: bool,
    call_count: Arc<Mutex<usize>>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl MockModeration {
    /// Create a mock that returns the given verdict list
    pub fn new(verdicts: Vec<ModerationVerdict>) -> Self {
        Self {
            verdicts,
            fail: false,
            call_count: Arc::new(Mutex::new(0)),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A single unflagged verdict
    pub fn clean() -> Self {
        Self::new(vec![ModerationVerdict::clean()])
    }

    /// A single verdict flagged for the given categories
    pub fn flagged<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(vec![ModerationVerdict::flagged_for(categories)])
    }

    /// A malformed response carrying no verdicts
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A service that fails every call
    pub fn failing() -> Self {
        let mut mock = Self::new(Vec::new());
        mock.fail = true;
        mock
    }

    /// Get the number of times moderate was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Inputs received, in call order
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl Default for MockModeration {
    fn default() -> Self {
        Self::clean()
    }
}

impl ModerationService for MockModeration {
    type Error = LlmError;

    async fn moderate(&self, input: &str) -> Result<Vec<ModerationVerdict>, Self::Error> {
        *self.call_count.lock().unwrap() += 1;
        self.inputs.lock().unwrap().push(input.to_string());

        if self.fail {
            return Err(LlmError::Communication("Mock moderation unavailable".to_string()));
        }
        Ok(self.verdicts.clone())
    }
}

/// Mock completion provider streaming pre-configured deltas
///
/// Records every request and counts every read so tests can observe how far
/// the consumer pulled the stream.
#[derive(Debug, Clone)]
pub struct MockCompletion {
    deltas: Vec<String>,
    fail_after: Option<usize>,
    reject: bool,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    reads: Arc<AtomicUsize>,
}

impl MockCompletion {
    /// Create a provider that streams the given deltas then ends cleanly
    pub fn new<I, S>(deltas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            deltas: deltas.into_iter().map(Into::into).collect(),
            fail_after: None,
            reject: false,
            delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail with a read error after `count` deltas have been emitted
    pub fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Refuse every request before any delta is produced
    pub fn rejecting() -> Self {
        let mut mock = Self::new(Vec::<String>::new());
        mock.reject = true;
        mock
    }

    /// Sleep before each delta
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of completion requests issued
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received, in call order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of `next_delta` calls made across all streams
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl CompletionService for MockCompletion {
    type Error = LlmError;
    type Stream = MockDeltaStream;

    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<Self::Stream, Self::Error> {
        self.requests.lock().unwrap().push(request);

        if self.reject {
            return Err(LlmError::Rejected {
                status: 400,
                message: "Mock rejection".to_string(),
            });
        }

        Ok(MockDeltaStream {
            remaining: self.deltas.iter().cloned().collect(),
            fail_after: self.fail_after,
            emitted: 0,
            delay: self.delay,
            reads: Arc::clone(&self.reads),
        })
    }
}

/// Stream handed out by [`MockCompletion`]
#[derive(Debug)]
pub struct MockDeltaStream {
    remaining: VecDeque<String>,
    fail_after: Option<usize>,
    emitted: usize,
    delay: Option<Duration>,
    reads: Arc<AtomicUsize>,
}

impl DeltaStream for MockDeltaStream {
    type Error = LlmError;

    async fn next_delta(&mut self) -> Option<Result<StreamChunk, Self::Error>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_after == Some(self.emitted) {
            self.fail_after = None;
            self.remaining.clear();
            return Some(Err(LlmError::Communication("Mock stream interrupted".to_string())));
        }

        let delta = self.remaining.pop_front()?;
        self.emitted += 1;
        Some(Ok(StreamChunk::new(delta)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest::new("mock", herald_domain::PromptPayload::new("p".into()), 8)
    }

    async fn drain(stream: &mut MockDeltaStream) -> Vec<Result<String, String>> {
        let mut out = Vec::new();
        while let Some(item) = stream.next_delta().await {
            out.push(item.map(|c| c.text().to_string()).map_err(|e| e.to_string()));
        }
        out
    }

    #[tokio::test]
    async fn test_mock_moderation_clean() {
        let moderation = MockModeration::clean();
        let verdicts = moderation.moderate("hello").await.unwrap();
        assert_eq!(verdicts.len(), 1);
        assert!(!verdicts[0].flagged);
        assert_eq!(moderation.call_count(), 1);
        assert_eq!(moderation.inputs(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_moderation_empty_and_failing() {
        assert!(MockModeration::empty().moderate("x").await.unwrap().is_empty());
        assert!(matches!(
            MockModeration::failing().moderate("x").await,
            Err(LlmError::Communication(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_completion_streams_in_order() {
        let provider = MockCompletion::new(["a", "", "b"]);
        let mut stream = provider.stream_completion(request()).await.unwrap();

        let items = drain(&mut stream).await;
        assert_eq!(
            items,
            vec![Ok("a".to_string()), Ok(String::new()), Ok("b".to_string())]
        );
        assert_eq!(provider.call_count(), 1);
        // three deltas plus the end signal
        assert_eq!(provider.reads(), 4);
    }

    #[tokio::test]
    async fn test_mock_completion_fail_after() {
        let provider = MockCompletion::new(["a", "b", "c"]).fail_after(1);
        let mut stream = provider.stream_completion(request()).await.unwrap();

        let items = drain(&mut stream).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok("a".to_string()));
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_mock_completion_rejecting() {
        let provider = MockCompletion::rejecting();
        let result = provider.stream_completion(request()).await;
        assert!(matches!(result, Err(LlmError::Rejected { status: 400, .. })));
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_mock_completion_clone_shares_state() {
        let provider1 = MockCompletion::new(["x"]);
        let provider2 = provider1.clone();
        provider1.requests.lock().unwrap().push(request());
        assert_eq!(provider2.call_count(), 1);
    }
}
