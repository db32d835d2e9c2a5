//! Core domain concepts shared across all subdomains.
//!
//! - [`id::generate_id`]: collision-free identifiers
//! - [`clock::now_millis`]: epoch timestamps

pub mod clock;
pub mod id;
