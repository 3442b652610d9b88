//! Destination for encoded frames

use std::future::Future;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors raised by frame sinks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The caller is gone
    #[error("Caller disconnected")]
    Closed,
}

/// Where encoded frames go
///
/// The streamer writes each frame, flushes it immediately and calls
/// [`FrameSink::finish`] exactly once when the stream ends for any reason.
pub trait FrameSink: Send + Sync {
    /// Queue one encoded frame
    fn write_frame(&mut self, frame: String) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Push queued frames to the caller, waiting until it has capacity
    fn flush(&mut self) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Resolves once the caller has disconnected
    fn closed(&self) -> impl Future<Output = ()> + Send;

    /// Terminate the output stream
    fn finish(&mut self);
}

/// One recorded sink operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// A frame was written
    Write(String),
    /// Written frames were flushed
    Flush,
    /// The stream was terminated
    Finish,
}

#[derive(Debug, Default)]
struct Recording {
    events: Vec<SinkEvent>,
    flushes: usize,
    disconnect_after: Option<usize>,
}

impl Recording {
    fn is_closed(&self) -> bool {
        self.disconnect_after.is_some_and(|limit| self.flushes >= limit)
    }
}

/// In-memory sink that records every operation in order
///
/// Clones share the same recording, so a test can hand one clone to the
/// pipeline and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingSink {
    /// Create a sink whose caller never disconnects
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a caller that disconnects after `flushes` flushes
    pub fn disconnect_after(flushes: usize) -> Self {
        let sink = Self::default();
        if let Ok(mut recording) = sink.recording.lock() {
            recording.disconnect_after = Some(flushes);
        }
        sink
    }

    /// Every operation in call order
    pub fn events(&self) -> Vec<SinkEvent> {
        self.recording
            .lock()
            .map(|r| r.events.clone())
            .unwrap_or_default()
    }

    /// Written frames in order
    pub fn frames(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Write(frame) => Some(frame),
                _ => None,
            })
            .collect()
    }

    /// All written frames concatenated, as the caller would receive them
    pub fn body(&self) -> String {
        self.frames().concat()
    }

    /// Number of flushes
    pub fn flush_count(&self) -> usize {
        self.recording.lock().map(|r| r.flushes).unwrap_or_default()
    }

    /// Number of times the stream was terminated
    pub fn finish_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| **event == SinkEvent::Finish)
            .count()
    }

    fn record(&self, event: SinkEvent) -> Result<(), SinkError> {
        let mut recording = self.recording.lock().map_err(|_| SinkError::Closed)?;
        if recording.is_closed() && event != SinkEvent::Finish {
            return Err(SinkError::Closed);
        }
        if event == SinkEvent::Flush {
            recording.flushes += 1;
        }
        recording.events.push(event);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.recording.lock().map(|r| r.is_closed()).unwrap_or(true)
    }
}

impl FrameSink for RecordingSink {
    async fn write_frame(&mut self, frame: String) -> Result<(), SinkError> {
        self.record(SinkEvent::Write(frame))
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.record(SinkEvent::Flush)
    }

    async fn closed(&self) {
        if self.is_closed() {
            return;
        }
        std::future::pending::<()>().await
    }

    fn finish(&mut self) {
        // Finish is recorded even after a disconnect
        let _ = self.record(SinkEvent::Finish);
    }
}
