//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface over the session
//! store and response orchestrator.

mod command;
mod repl;

pub use command::{ReplCommand, SessionRef};
pub use repl::ChatRepl;
