//! OpenAI-compatible completion endpoint adapter.

pub mod client;
pub mod wire;

pub use client::{OpenAiCompatibleClient, OpenAiConfig};
