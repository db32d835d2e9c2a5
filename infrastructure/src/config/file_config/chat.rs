//! Chat behavior configuration from TOML (`[chat]` section)

use parley_application::{DEFAULT_STOP_MARKER, OrchestratorConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Appended to a reply that was stopped mid-stream
    pub stop_marker: String,
    /// Show a spinner until the first chunk arrives
    pub show_spinner: bool,
    /// Path to the line-editor history file
    pub history_file: Option<String>,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            stop_marker: DEFAULT_STOP_MARKER.to_string(),
            show_spinner: true,
            history_file: None,
        }
    }
}

impl FileChatConfig {
    pub fn to_orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::default().with_stop_marker(self.stop_marker.clone())
    }
}
