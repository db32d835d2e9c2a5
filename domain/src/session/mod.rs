//! Conversation session domain.
//!
//! - [`entities::Session`]: a titled, ordered conversation
//! - [`entities::Message`]: a single message within a session
//! - [`collection::SessionCollection`]: all sessions plus the active pointer
//! - [`stream::StreamEvent`]: incremental events of an assistant reply

pub mod collection;
pub mod entities;
pub mod stream;
pub mod title;
