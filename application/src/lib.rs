//! Application layer for parley
//!
//! This crate contains the stateful services (session store, response
//! orchestrator), port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod store;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_DEBOUNCE, DEFAULT_STOP_MARKER, OrchestratorConfig, StoreConfig};
pub use ports::{
    completion_gateway::{
        CompletionError, CompletionGateway, NoStreamObserver, StreamHandle, StreamObserver,
    },
    session_persistence::SessionPersistence,
    turn_progress::{NoTurnProgress, TurnProgressNotifier},
};
pub use store::SessionStore;
pub use use_cases::orchestrate_response::{OrchestratorError, ResponseOrchestrator};
