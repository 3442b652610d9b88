//! Incremental decoder for `text/event-stream` bodies
//!
//! Only `data:` fields matter to chat-completion streams; comments, event
//! names and ids are skipped. Lines may be split across network chunks, so
//! bytes are buffered until a newline arrives.

use crate::LlmError;

/// Terminal payload OpenAI-compatible providers send after the last delta
const DONE_MARKER: &str = "[DONE]";

/// One decoded server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SseEvent {
    /// A `data:` payload
    Data(String),
    /// The explicit end-of-stream marker
    Done,
}

#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every event completed by them
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>, LlmError> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(event) = decode_line(&line[..line.len() - 1])? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Flush a trailing line that was not newline-terminated
    pub(crate) fn finish(&mut self) -> Result<Vec<SseEvent>, LlmError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        let line = std::mem::take(&mut self.buffer);
        Ok(decode_line(&line)?.into_iter().collect())
    }
}

fn decode_line(raw: &[u8]) -> Result<Option<SseEvent>, LlmError> {
    let line = std::str::from_utf8(raw)
        .map_err(|e| LlmError::InvalidResponse(format!("Stream is not valid UTF-8: {}", e)))?;
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.is_empty() || line.starts_with(':') {
        return Ok(None);
    }

    let Some(payload) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let payload = payload.strip_prefix(' ').unwrap_or(payload);

    if payload.trim() == DONE_MARKER {
        Ok(Some(SseEvent::Done))
    } else {
        Ok(Some(SseEvent::Data(payload.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_complete_events() {
        let mut decoder = SseDecoder::new();
        let events = decoder
            .push(b"data: {\"a\":1}\n\ndata: [DONE]\n\n")
            .unwrap();
        assert_eq!(
            events,
            vec![SseEvent::Data("{\"a\":1}".to_string()), SseEvent::Done]
        );
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"con").unwrap().is_empty());
        let events = decoder.push(b"tent\":\"x\"}\r\n\r\n").unwrap();
        assert_eq!(events, vec![SseEvent::Data("{\"content\":\"x\"}".to_string())]);
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let bytes = "data: é\n".as_bytes();
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&bytes[..7]).unwrap().is_empty());
        let events = decoder.push(&bytes[7..]).unwrap();
        assert_eq!(events, vec![SseEvent::Data("é".to_string())]);
    }

    #[test]
    fn test_skips_comments_and_other_fields() {
        let mut decoder = SseDecoder::new();
        let events = decoder
            .push(b": keep-alive\nevent: message\nid: 7\ndata:raw\n")
            .unwrap();
        assert_eq!(events, vec![SseEvent::Data("raw".to_string())]);
    }

    #[test]
    fn test_finish_flushes_trailing_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: [DONE]").unwrap().is_empty());
        assert_eq!(decoder.finish().unwrap(), vec![SseEvent::Done]);
        assert!(decoder.finish().unwrap().is_empty());
    }
}
