//! Session store parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default quiet period before a debounced write
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Persistence behavior of [`SessionStore`](crate::store::SessionStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Quiet period after the last mutation before the collection is written.
    pub debounce: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl StoreConfig {
    pub fn with_debounce_ms(mut self, millis: u64) -> Self {
        self.debounce = Duration::from_millis(millis);
        self
    }
}
