//! Use cases for the application layer.

pub mod orchestrate_response;

pub use orchestrate_response::{OrchestratorError, ResponseOrchestrator};
