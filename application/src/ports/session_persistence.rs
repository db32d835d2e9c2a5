//! Session persistence port
//!
//! The store hands snapshots to this port and never expects it to fail
//! loudly: implementations log problems and carry on.

use async_trait::async_trait;
use parley_domain::SessionCollection;

/// Reads and writes the full session collection
#[async_trait]
pub trait SessionPersistence: Send + Sync {
    /// Load every persisted session. Missing or corrupt data yields an
    /// empty collection.
    async fn load(&self) -> SessionCollection;

    /// Persist a snapshot (best-effort).
    async fn save(&self, sessions: &SessionCollection);

    /// Remove all persisted sessions.
    async fn clear(&self);
}
