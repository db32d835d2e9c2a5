//! Infrastructure layer for parley
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the streaming HTTP client and its decoder, the
//! offline generator, session persistence, and configuration loading.

pub mod config;
pub mod offline;
pub mod openai;
pub mod sse;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use offline::{OfflineGateway, OfflinePolicy};
pub use openai::{OpenAiCompatibleClient, OpenAiConfig};
pub use storage::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SESSIONS_KEY, SessionGateway,
    StorageError,
};
