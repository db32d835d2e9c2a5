//! Console rendering of sessions and messages

pub mod console;
