//! Frame parsing for OpenAI-style completion streams.

use serde::Deserialize;
use thiserror::Error;

/// Terminal payload of the stream
pub const DONE_MARKER: &str = "[DONE]";

const DATA_FIELD: &str = "data:";

/// A frame whose payload could not be decoded. Never fatal to the stream.
#[derive(Error, Debug)]
#[error("malformed frame `{frame}`: {source}")]
pub struct DecodeError {
    frame: String,
    #[source]
    source: serde_json::Error,
}

/// A single line of the stream, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Blank lines, comments and non-data fields
    Ignored,
    /// The terminal `data: [DONE]` frame
    Done,
    /// Incremental text (possibly empty)
    Delta(String),
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Classify one line of the stream.
pub fn parse_frame(line: &str) -> Result<Frame, DecodeError> {
    if line.trim().is_empty() || line.starts_with(':') {
        return Ok(Frame::Ignored);
    }
    let Some(payload) = line.strip_prefix(DATA_FIELD) else {
        return Ok(Frame::Ignored);
    };
    let payload = payload.trim();
    if payload == DONE_MARKER {
        return Ok(Frame::Done);
    }

    let chunk: CompletionChunk = serde_json::from_str(payload).map_err(|source| DecodeError {
        frame: parley_domain::util::preview(line, 100),
        source,
    })?;
    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta)
        .and_then(|d| d.content)
        .unwrap_or_default();
    Ok(Frame::Delta(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_delta_content() {
        let frame = parse_frame(r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#).unwrap();
        assert_eq!(frame, Frame::Delta("Hi".into()));
    }

    #[test]
    fn recognizes_done_marker() {
        assert_eq!(parse_frame("data: [DONE]").unwrap(), Frame::Done);
        assert_eq!(parse_frame("data:[DONE]").unwrap(), Frame::Done);
    }

    #[test]
    fn missing_or_null_content_is_empty_delta() {
        let role_only = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_frame(role_only).unwrap(), Frame::Delta(String::new()));

        let null = r#"data: {"choices":[{"delta":{"content":null},"finish_reason":"stop"}]}"#;
        assert_eq!(parse_frame(null).unwrap(), Frame::Delta(String::new()));

        assert_eq!(
            parse_frame(r#"data: {"choices":[]}"#).unwrap(),
            Frame::Delta(String::new())
        );
    }

    #[test]
    fn ignores_blank_comment_and_other_fields() {
        assert_eq!(parse_frame("").unwrap(), Frame::Ignored);
        assert_eq!(parse_frame("   ").unwrap(), Frame::Ignored);
        assert_eq!(parse_frame(": keep-alive").unwrap(), Frame::Ignored);
        assert_eq!(parse_frame("event: message").unwrap(), Frame::Ignored);
        assert_eq!(parse_frame("id: 42").unwrap(), Frame::Ignored);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_frame("data: {not json}").unwrap_err();
        assert!(err.to_string().contains("malformed frame"));
    }
}
