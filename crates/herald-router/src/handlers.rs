//! HTTP request handlers for the answer server.
//!
//! Implements the streaming answer endpoint and the health check using axum.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use herald_domain::traits::{CompletionService, DocumentSource, ModerationService};
use herald_pipeline::{ErrorBody, FrameSink, Pipeline, PipelineError, SinkError};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Shared application state
pub struct AppState<D, M, C>
where
    D: DocumentSource,
    M: ModerationService,
    C: CompletionService,
{
    /// The request pipeline
    pub pipeline: Arc<Pipeline<D, M, C>>,
}

impl<D, M, C> AppState<D, M, C>
where
    D: DocumentSource,
    M: ModerationService,
    C: CompletionService,
{
    /// Wrap a pipeline for sharing across requests
    pub fn new(pipeline: Pipeline<D, M, C>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

impl<D, M, C> Clone for AppState<D, M, C>
where
    D: DocumentSource,
    M: ModerationService,
    C: CompletionService,
{
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of configured corpus documents
    pub documents: usize,
}

/// Frame sink backed by the HTTP response body
///
/// Frames are handed to the body through a channel with room for a single
/// chunk, so each flush waits until the previous chunk has been taken.
pub struct ChannelSink {
    tx: Option<mpsc::Sender<Bytes>>,
    buffer: String,
}

impl ChannelSink {
    /// Create a sink and the receiving end the body is built from
    pub fn new() -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(1);
        (
            Self {
                tx: Some(tx),
                buffer: String::new(),
            },
            rx,
        )
    }
}

impl FrameSink for ChannelSink {
    async fn write_frame(&mut self, frame: String) -> Result<(), SinkError> {
        if self.tx.is_none() {
            return Err(SinkError::Closed);
        }
        self.buffer.push_str(&frame);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        let Some(tx) = &self.tx else {
            return Err(SinkError::Closed);
        };
        if self.buffer.is_empty() {
            return Ok(());
        }
        let chunk = Bytes::from(std::mem::take(&mut self.buffer));
        tx.send(chunk).await.map_err(|_| SinkError::Closed)
    }

    async fn closed(&self) {
        if let Some(tx) = &self.tx {
            tx.closed().await;
        }
    }

    fn finish(&mut self) {
        self.tx = None;
    }
}

/// Build the streaming response around the receiving end of a [`ChannelSink`]
fn stream_response(rx: mpsc::Receiver<Bytes>) -> Response {
    let chunks = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (Ok::<_, Infallible>(chunk), rx))
    });

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Body::from_stream(chunks),
    )
        .into_response()
}

/// Render a pipeline failure as a structured JSON body
fn error_response(error: &PipelineError) -> Response {
    let (status, body) = error.to_response();
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

/// Any other method on the answer route
async fn method_not_allowed() -> Response {
    let body = ErrorBody {
        error: "Method not allowed".to_string(),
        data: None,
    };
    (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response()
}

/// POST <route> - Answer one question as a stream of wire frames
///
/// Every failure before the stream opens is answered with a structured
/// error body. Once the provider has accepted the request the response is
/// committed and the answer is forwarded from a background task.
async fn answer<D, M, C>(State(state): State<AppState<D, M, C>>, body: Bytes) -> Response
where
    D: DocumentSource + 'static,
    M: ModerationService + 'static,
    C: CompletionService + 'static,
{
    let span = info_span!("answer", request_id = %Uuid::now_v7());

    async move {
        match state.pipeline.prepare(&body).await {
            Ok(prepared) => {
                let (sink, rx) = ChannelSink::new();
                tokio::spawn(prepared.stream_into(sink).in_current_span());
                stream_response(rx)
            }
            Err(e) => error_response(&e),
        }
    }
    .instrument(span)
    .await
}

/// GET /health - Liveness and corpus size
async fn health_check<D, M, C>(State(state): State<AppState<D, M, C>>) -> Json<HealthCheckResponse>
where
    D: DocumentSource + 'static,
    M: ModerationService + 'static,
    C: CompletionService + 'static,
{
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        documents: state.pipeline.documents(),
    })
}

/// Create the axum router with all routes
///
/// Methods other than POST on the answer route are refused with 405 and a
/// JSON error body.
pub fn create_router<D, M, C>(state: AppState<D, M, C>, route: &str) -> AxumRouter
where
    D: DocumentSource + 'static,
    M: ModerationService + 'static,
    C: CompletionService + 'static,
{
    AxumRouter::new()
        .route(route, post(answer::<D, M, C>).fallback(method_not_allowed))
        .route("/health", get(health_check::<D, M, C>))
        .with_state(state)
}
