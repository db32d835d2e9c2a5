//! Ports (interfaces) for the application layer.
//!
//! Implemented by adapters in the infrastructure and presentation layers.

pub mod completion_gateway;
pub mod session_persistence;
pub mod turn_progress;
