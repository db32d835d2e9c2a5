//! Request and error payloads of the `/chat/completions` endpoint.

use parley_domain::ChatMessage;
use serde::{Deserialize, Serialize};

/// Streaming chat completion request body
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Error body; providers disagree on where the message lives
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Object {
        #[serde(default)]
        message: Option<String>,
    },
    Text(String),
}

/// Human-readable message for a non-success response.
pub fn error_message(status: u16, body: &[u8]) -> String {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let from_detail = parsed.error.and_then(|detail| match detail {
        ErrorDetail::Object { message } => message,
        ErrorDetail::Text(text) => Some(text),
    });
    parsed
        .message
        .or(from_detail)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            format!("API request failed (status {status}); check the API key and model name")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_wire_fields() {
        let messages = vec![ChatMessage::user("hi")];
        let body = ChatCompletionRequest {
            model: "deepseek-chat",
            messages: &messages,
            stream: true,
            temperature: 0.7,
            max_tokens: 2000,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["stream"], true);
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn message_from_top_level_field() {
        assert_eq!(error_message(400, br#"{"message":"bad model"}"#), "bad model");
    }

    #[test]
    fn message_from_nested_error() {
        let body = br#"{"error":{"message":"Invalid API key","type":"auth"}}"#;
        assert_eq!(error_message(401, body), "Invalid API key");
        assert_eq!(error_message(500, br#"{"error":"overloaded"}"#), "overloaded");
    }

    #[test]
    fn falls_back_to_template() {
        assert_eq!(
            error_message(502, b"<html>Bad Gateway</html>"),
            "API request failed (status 502); check the API key and model name"
        );
        assert_eq!(
            error_message(404, br#"{"message":""}"#),
            "API request failed (status 404); check the API key and model name"
        );
    }
}
