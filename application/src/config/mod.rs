//! Application-level configuration.
//!
//! This module provides configuration types that control how the stateful
//! services behave:
//!
//! - [`StoreConfig`]: debounced persistence of the session store
//! - [`OrchestratorConfig`]: turn handling in the response orchestrator

pub mod orchestrator_config;
pub mod store_config;

pub use orchestrator_config::{DEFAULT_STOP_MARKER, OrchestratorConfig};
pub use store_config::{DEFAULT_DEBOUNCE, StoreConfig};
