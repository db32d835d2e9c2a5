//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout one section per module.
//! Every field has a default so partial files deserialize cleanly.

mod api;
mod chat;
mod offline;
mod storage;
mod stream;

pub use api::FileApiConfig;
pub use chat::FileChatConfig;
pub use offline::FileOfflineConfig;
pub use storage::FileStorageConfig;
pub use stream::FileStreamConfig;

use crate::openai::OpenAiConfig;
use parley_application::StoreConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("api.temperature must be within [0, 2], got {0}")]
    InvalidTemperature(f32),

    #[error("api.max_tokens must be greater than 0")]
    ZeroMaxTokens,

    #[error("api.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("api.model cannot be empty")]
    EmptyModelName,

    #[error("{field} must be within [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },

    #[error("{field}: minimum {min}ms exceeds maximum {max}ms")]
    InvertedDelay {
        field: &'static str,
        min: u64,
        max: u64,
    },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Completion endpoint settings
    pub api: FileApiConfig,
    /// Stream decoding settings
    pub stream: FileStreamConfig,
    /// Session persistence settings
    pub storage: FileStorageConfig,
    /// Offline generator settings
    pub offline: FileOfflineConfig,
    /// Chat behavior settings
    pub chat: FileChatConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        self.api.validate(&mut issues);
        self.offline.validate(&mut issues);
        issues
    }

    /// Client settings for the real endpoint, or `None` for offline mode
    pub fn openai_config(&self) -> Option<OpenAiConfig> {
        let (base_url, api_key) = self.api.credentials()?;
        let mut config = OpenAiConfig::new(base_url, api_key, self.api.model.clone());
        config.temperature = self.api.temperature;
        config.max_tokens = self.api.max_tokens;
        config.connect_timeout = self.api.timeout_seconds.map(Duration::from_secs);
        config.min_emit_interval = self.stream.min_emit_interval();
        Some(config)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default().with_debounce_ms(self.storage.debounce_ms)
    }
}
