//! Identifier generation.
//!
//! Identifiers are UUIDv7 strings: a millisecond timestamp prefix followed
//! by random bits. The `uuid` crate keeps a shared counter inside the
//! timestamp's sub-millisecond precision, so ids minted in the same
//! millisecond are still distinct and sort in creation order.

use uuid::Uuid;

/// Generate a fresh, process-unique identifier
pub fn generate_id() -> String {
    Uuid::now_v7().simple().to_string()
}
