//! Persistence gateway storing the session collection as a JSON envelope

use super::kv::{KeyValueStore, StorageError};
use async_trait::async_trait;
use parley_application::SessionPersistence;
use parley_domain::{Session, SessionCollection, now_millis};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Key the collection is stored under
pub const SESSIONS_KEY: &str = "parley-sessions";

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    sessions: &'a [Session],
    timestamp: i64,
}

#[derive(Deserialize)]
struct Envelope {
    sessions: Vec<Session>,
}

/// [`SessionPersistence`] over any [`KeyValueStore`].
///
/// Failures are logged and swallowed: a broken store degrades to an empty
/// history rather than taking the chat down.
pub struct SessionGateway {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl SessionGateway {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: SESSIONS_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    async fn read(&self) -> Result<Option<Vec<Session>>, StorageError> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(None);
        };
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        if !value.get("sessions").is_some_and(|s| s.is_array()) {
            warn!("Stored session data has no sessions array; starting empty");
            return Ok(None);
        }
        let envelope: Envelope = serde_json::from_value(value)?;
        Ok(Some(envelope.sessions))
    }

    async fn write(&self, sessions: &SessionCollection) -> Result<(), StorageError> {
        let envelope = EnvelopeRef {
            sessions: sessions.sessions(),
            timestamp: now_millis(),
        };
        let raw = serde_json::to_string(&envelope)?;
        self.store.set(&self.key, &raw).await
    }
}

#[async_trait]
impl SessionPersistence for SessionGateway {
    async fn load(&self) -> SessionCollection {
        match self.read().await {
            Ok(Some(sessions)) => {
                debug!("Loaded {} stored sessions", sessions.len());
                SessionCollection::from_sessions(sessions, None)
            }
            Ok(None) => SessionCollection::new(),
            Err(e) => {
                warn!("Failed to load sessions: {}", e);
                SessionCollection::new()
            }
        }
    }

    async fn save(&self, sessions: &SessionCollection) {
        if let Err(e) = self.write(sessions).await {
            warn!("Failed to save sessions: {}", e);
        }
    }

    async fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key).await {
            warn!("Failed to clear stored sessions: {}", e);
        }
    }
}
