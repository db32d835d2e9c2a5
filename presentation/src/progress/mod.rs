//! Live rendering of streaming turns

pub mod reporter;
