//! Streaming configuration from TOML (`[stream]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStreamConfig {
    /// Minimum spacing between delta events, in milliseconds
    pub min_emit_interval_ms: u64,
}

impl Default for FileStreamConfig {
    fn default() -> Self {
        Self {
            min_emit_interval_ms: 50,
        }
    }
}

impl FileStreamConfig {
    pub fn min_emit_interval(&self) -> Duration {
        Duration::from_millis(self.min_emit_interval_ms)
    }
}
