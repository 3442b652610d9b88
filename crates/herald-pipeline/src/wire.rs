//! Caller-facing wire framing
//!
//! Each delta travels as one line: `0:"<escaped>"\n`. Backslash, double
//! quote, newline and carriage return are escaped; every other character is
//! passed through unchanged.

use thiserror::Error;

/// Prefix of every text frame
pub const FRAME_PREFIX: &str = "0:";

/// Errors raised while decoding frames
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Line does not start with the text frame prefix
    #[error("Frame is missing the 0: prefix: {0}")]
    MissingPrefix(String),

    /// Payload is not wrapped in double quotes
    #[error("Frame payload is not quoted: {0}")]
    Unquoted(String),

    /// Backslash followed by a character outside the escape set
    #[error("Invalid escape sequence \\{0}")]
    InvalidEscape(char),

    /// Payload ends in a lone backslash
    #[error("Frame ends inside an escape sequence")]
    TrailingBackslash,
}

/// Encode one delta as a wire frame, including the trailing newline
///
/// Returns `None` for an empty delta; empty deltas are never framed.
pub fn encode_frame(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    let mut frame = String::with_capacity(text.len() + FRAME_PREFIX.len() + 3);
    frame.push_str(FRAME_PREFIX);
    frame.push('"');
    for c in text.chars() {
        match c {
            '\\' => frame.push_str("\\\\"),
            '"' => frame.push_str("\\\""),
            '\n' => frame.push_str("\\n"),
            '\r' => frame.push_str("\\r"),
            other => frame.push(other),
        }
    }
    frame.push_str("\"\n");
    Some(frame)
}

/// Decode a single frame line back into its delta
///
/// The trailing newline is optional. The payload is scanned left to right so
/// that an escaped backslash is never re-read as the start of another escape.
pub fn decode_frame(line: &str) -> Result<String, WireError> {
    let line = line.strip_suffix('\n').unwrap_or(line);

    let payload = line
        .strip_prefix(FRAME_PREFIX)
        .ok_or_else(|| WireError::MissingPrefix(line.to_string()))?;

    let inner = payload
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .ok_or_else(|| WireError::Unquoted(payload.to_string()))?;

    let mut text = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => text.push('\\'),
            Some('"') => text.push('"'),
            Some('n') => text.push('\n'),
            Some('r') => text.push('\r'),
            Some(other) => return Err(WireError::InvalidEscape(other)),
            None => return Err(WireError::TrailingBackslash),
        }
    }
    Ok(text)
}

/// Reconstruct the full answer from a streamed body
///
/// Frames are decoded in arrival order and concatenated.
pub fn decode_body(body: &str) -> Result<String, WireError> {
    body.split_terminator('\n')
        .map(decode_frame)
        .collect::<Result<Vec<_>, _>>()
        .map(|parts| parts.concat())
}
