//! Conversation turns.
//!
//! - [`turn::TurnState`]: lifecycle of one request/response exchange
//! - [`history::ChatMessage`]: the `{role, content}` pairs sent upstream

pub mod history;
pub mod turn;
