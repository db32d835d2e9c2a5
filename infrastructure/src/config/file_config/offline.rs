//! Offline generator configuration from TOML (`[offline]` section)

use super::ConfigValidationError;
use crate::offline::{DelayRange, OfflinePolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw offline generator configuration from TOML
///
/// # Example
///
/// ```toml
/// [offline]
/// failure_probability = 0.2
/// card_probability = 0.2
/// char_delay_min_ms = 20
/// char_delay_max_ms = 50
/// seed = 42                   # reproducible replies
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOfflineConfig {
    pub failure_probability: f64,
    pub card_probability: f64,
    pub char_delay_min_ms: u64,
    pub char_delay_max_ms: u64,
    pub reply_delay_min_ms: u64,
    pub reply_delay_max_ms: u64,
    pub failure_delay_min_ms: u64,
    pub failure_delay_max_ms: u64,
    pub card_delay_ms: u64,
    pub card_settle_ms: u64,
    pub seed: Option<u64>,
}

impl Default for FileOfflineConfig {
    fn default() -> Self {
        Self {
            failure_probability: 0.2,
            card_probability: 0.2,
            char_delay_min_ms: 20,
            char_delay_max_ms: 50,
            reply_delay_min_ms: 1000,
            reply_delay_max_ms: 2000,
            failure_delay_min_ms: 1500,
            failure_delay_max_ms: 2500,
            card_delay_ms: 800,
            card_settle_ms: 300,
            seed: None,
        }
    }
}

impl FileOfflineConfig {
    pub fn to_policy(&self) -> OfflinePolicy {
        OfflinePolicy {
            failure_probability: self.failure_probability,
            card_probability: self.card_probability,
            char_delay: DelayRange::from_millis(self.char_delay_min_ms, self.char_delay_max_ms),
            reply_delay: DelayRange::from_millis(self.reply_delay_min_ms, self.reply_delay_max_ms),
            failure_delay: DelayRange::from_millis(
                self.failure_delay_min_ms,
                self.failure_delay_max_ms,
            ),
            card_delay: Duration::from_millis(self.card_delay_ms),
            card_settle: Duration::from_millis(self.card_settle_ms),
            seed: self.seed,
        }
    }

    pub(super) fn validate(&self, issues: &mut Vec<ConfigValidationError>) {
        for (field, value) in [
            ("offline.failure_probability", self.failure_probability),
            ("offline.card_probability", self.card_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(ConfigValidationError::InvalidProbability { field, value });
            }
        }
        for (field, min, max) in [
            ("offline.char_delay", self.char_delay_min_ms, self.char_delay_max_ms),
            ("offline.reply_delay", self.reply_delay_min_ms, self.reply_delay_max_ms),
            ("offline.failure_delay", self.failure_delay_min_ms, self.failure_delay_max_ms),
        ] {
            if min > max {
                issues.push(ConfigValidationError::InvertedDelay { field, min, max });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_defaults() {
        assert_eq!(FileOfflineConfig::default().to_policy(), OfflinePolicy::default());
    }

    #[test]
    fn out_of_range_values_are_reported() {
        let config = FileOfflineConfig {
            failure_probability: 1.5,
            reply_delay_min_ms: 3000,
            ..Default::default()
        };
        let mut issues = Vec::new();
        config.validate(&mut issues);
        assert_eq!(issues.len(), 2);
        assert!(matches!(
            issues[0],
            ConfigValidationError::InvalidProbability { field: "offline.failure_probability", .. }
        ));
        assert!(matches!(
            issues[1],
            ConfigValidationError::InvertedDelay { field: "offline.reply_delay", .. }
        ));
    }
}
