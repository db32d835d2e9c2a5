//! Session domain entities

use crate::core::clock::now_millis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery status of a message.
///
/// `Loading` only lasts from creation until the first terminal update.
/// For assistant messages `Sent` means "content visible", not "turn complete".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Loading,
    Sent,
    Error,
}

/// Content discriminator for messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Card,
}

/// Article card attached to `card`-typed messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCard {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub url: String,
}

/// Error detail carried by a message in `Error` status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Human-readable description
    pub message: String,
    /// Optional machine-readable code (e.g. `RATE_LIMIT`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default = "default_retryable")]
    pub retryable: bool,
}

fn default_retryable() -> bool {
    true
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            retryable: true,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

/// A message in a session (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Creation instant (Unix milliseconds)
    pub timestamp: i64,
    pub status: MessageStatus,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_data: Option<ArticleCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_info: Option<ErrorInfo>,
}

impl Message {
    pub fn is_card(&self) -> bool {
        self.kind == Some(MessageKind::Card)
    }

    /// Apply a partial update. Fields absent from the patch are left untouched.
    pub fn apply(&mut self, patch: MessagePatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(kind) = patch.kind {
            self.kind = Some(kind);
        }
        if let Some(card) = patch.card_data {
            self.card_data = Some(card);
        }
        if let Some(error_info) = patch.error_info {
            self.error_info = error_info;
        }
    }
}

/// Message fields supplied by the caller of an append; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
    pub status: MessageStatus,
    pub kind: Option<MessageKind>,
}

impl NewMessage {
    /// A user message, already delivered
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: now_millis(),
            status: MessageStatus::Sent,
            kind: None,
        }
    }

    /// An empty assistant placeholder awaiting a response
    pub fn assistant_placeholder() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            timestamp: now_millis(),
            status: MessageStatus::Loading,
            kind: None,
        }
    }

    pub fn into_message(self, id: String) -> Message {
        Message {
            id,
            role: self.role,
            content: self.content,
            timestamp: self.timestamp,
            status: self.status,
            kind: self.kind,
            card_data: None,
            error_info: None,
        }
    }
}

/// Partial-field update for a message (shallow overwrite).
///
/// `error_info` is doubly optional: `Some(None)` clears the detail,
/// `None` leaves it as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub status: Option<MessageStatus>,
    pub kind: Option<MessageKind>,
    pub card_data: Option<ArticleCard>,
    pub error_info: Option<Option<ErrorInfo>>,
}

impl MessagePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(mut self, kind: MessageKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn card(mut self, card: ArticleCard) -> Self {
        self.card_data = Some(card);
        self
    }

    pub fn error(mut self, info: ErrorInfo) -> Self {
        self.status = Some(MessageStatus::Error);
        self.error_info = Some(Some(info));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error_info = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A conversation session (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Title given to sessions before their first user message
pub const DEFAULT_SESSION_TITLE: &str = "New chat";

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: id.into(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump `updated_at`, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_at = self.updated_at.max(now_millis());
    }

    pub fn position_of(&self, message_id: &str) -> Option<usize> {
        self.messages.iter().position(|m| m.id == message_id)
    }

    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
