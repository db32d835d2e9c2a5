//! Offline mode: simulated replies without a completion endpoint

mod catalog;
mod generator;
mod policy;

pub use generator::OfflineGateway;
pub use policy::{DelayRange, OfflinePolicy};
