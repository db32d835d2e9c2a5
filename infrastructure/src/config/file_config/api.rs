//! Completion endpoint configuration from TOML (`[api]` section)

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};

/// Raw API configuration from TOML
///
/// # Example
///
/// ```toml
/// [api]
/// base_url = "https://api.deepseek.com"
/// api_key = "sk-..."          # or PARLEY_API__API_KEY
/// model = "deepseek-chat"
/// temperature = 0.7
/// max_tokens = 2000
/// timeout_seconds = 30        # connect timeout, optional
/// use_real_api = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: Option<u64>,
    /// When false, replies come from the offline generator
    pub use_real_api: bool,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: "deepseek-chat".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout_seconds: None,
            use_real_api: true,
        }
    }
}

impl FileApiConfig {
    /// Endpoint and key, if the real API is enabled and both are non-blank
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if !self.use_real_api {
            return None;
        }
        let base_url = self.base_url.as_deref().map(str::trim)?;
        let api_key = self.api_key.as_deref().map(str::trim)?;
        (!base_url.is_empty() && !api_key.is_empty()).then_some((base_url, api_key))
    }

    pub(super) fn validate(&self, issues: &mut Vec<ConfigValidationError>) {
        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigValidationError::InvalidTemperature(self.temperature));
        }
        if self.max_tokens == 0 {
            issues.push(ConfigValidationError::ZeroMaxTokens);
        }
        if self.timeout_seconds == Some(0) {
            issues.push(ConfigValidationError::InvalidTimeout);
        }
        if self.model.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyModelName);
        }
    }
}
