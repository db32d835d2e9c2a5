//! Message history sent to the completion endpoint

use crate::session::entities::{Message, MessageStatus, Role};
use serde::{Deserialize, Serialize};

/// A `{role, content}` pair as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Build the upstream history from session messages.
///
/// Failed, still-loading and empty messages are skipped; they carry no
/// conversational content.
pub fn build_history(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .filter(|m| m.status == MessageStatus::Sent && !m.content.is_empty())
        .map(|m| ChatMessage {
            role: m.role,
            content: m.content.clone(),
        })
        .collect()
}
