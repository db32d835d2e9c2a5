//! Domain layer for parley
//!
//! This crate contains the conversation entities and the invariants that
//! keep them consistent. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Sessions
//!
//! A [`Session`] is a titled, ordered list of [`Message`]s. The
//! [`SessionCollection`] owns every session plus the pointer to the active
//! one, and is the only place session data is mutated.
//!
//! ## Turns
//!
//! A turn is one request/response exchange: a user prompt followed by a
//! streamed assistant reply ([`StreamEvent`]). Its lifecycle is tracked by
//! [`TurnState`].

pub mod conversation;
pub mod core;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use conversation::{
    history::{ChatMessage, build_history},
    turn::{TurnOutcome, TurnState},
};
pub use core::{clock::now_millis, id::generate_id};
pub use session::{
    collection::SessionCollection,
    entities::{
        ArticleCard, DEFAULT_SESSION_TITLE, ErrorInfo, Message, MessageKind, MessagePatch,
        MessageStatus, NewMessage, Role, Session,
    },
    stream::StreamEvent,
    title::derive_title,
};
