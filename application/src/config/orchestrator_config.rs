//! Response orchestrator parameters.

use serde::{Deserialize, Serialize};

/// Text appended to an assistant message when the user stops generation
pub const DEFAULT_STOP_MARKER: &str = "\n\n[generation stopped]";

/// Turn handling in [`ResponseOrchestrator`](crate::use_cases::orchestrate_response::ResponseOrchestrator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub stop_marker: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            stop_marker: DEFAULT_STOP_MARKER.to_string(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_stop_marker(mut self, marker: impl Into<String>) -> Self {
        self.stop_marker = marker.into();
        self
    }
}
