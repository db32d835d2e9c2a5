//! Session store service.
//!
//! [`SessionStore`] owns the [`SessionCollection`] for the lifetime of the
//! process. Every mutation runs synchronously against the in-memory state
//! and then (re)schedules a debounced write through the
//! [`SessionPersistence`] port.
//!
//! ## Debounced persistence
//!
//! The store keeps a single "pending save" slot. Each mutation aborts the
//! task in the slot and replaces it with a new one that sleeps for the
//! debounce window and then writes a snapshot taken at fire time. A burst of
//! mutations therefore produces exactly one write carrying the final state.
//! [`SessionStore::flush`] skips the wait for orderly shutdown.

use crate::config::StoreConfig;
use crate::ports::session_persistence::SessionPersistence;
use parley_domain::{
    Message, MessagePatch, NewMessage, Session, SessionCollection, generate_id,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info};

struct StoreInner {
    sessions: Mutex<SessionCollection>,
    persistence: Arc<dyn SessionPersistence>,
    config: StoreConfig,
    pending_save: Mutex<Option<JoinHandle<()>>>,
}

impl StoreInner {
    fn sessions(&self) -> MutexGuard<'_, SessionCollection> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn pending_save(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending_save.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn snapshot(&self) -> SessionCollection {
        self.sessions().clone()
    }
}

/// Owner of all conversation sessions.
///
/// Cheap to clone; clones share the same state. Mutating methods must be
/// called from within a Tokio runtime since they schedule the debounced
/// write.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    /// Create a store over an empty collection.
    pub fn new(persistence: Arc<dyn SessionPersistence>, config: StoreConfig) -> Self {
        Self::with_sessions(SessionCollection::new(), persistence, config)
    }

    fn with_sessions(
        sessions: SessionCollection,
        persistence: Arc<dyn SessionPersistence>,
        config: StoreConfig,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                sessions: Mutex::new(sessions),
                persistence,
                config,
                pending_save: Mutex::new(None),
            }),
        }
    }

    /// Read the persisted collection once and build the store.
    ///
    /// The most recently updated session becomes active.
    pub async fn load(persistence: Arc<dyn SessionPersistence>, config: StoreConfig) -> Self {
        let loaded = persistence.load().await;
        let sessions = SessionCollection::from_sessions(loaded.into_sessions(), None);
        info!(
            "Loaded {} session(s), active: {}",
            sessions.len(),
            sessions.active_session_id().unwrap_or("none")
        );
        Self::with_sessions(sessions, persistence, config)
    }

    // ==================== Views ====================

    /// Run `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&SessionCollection) -> R) -> R {
        f(&self.inner.sessions())
    }

    pub fn snapshot(&self) -> SessionCollection {
        self.inner.snapshot()
    }

    pub fn active_session_id(&self) -> Option<String> {
        self.read(|c| c.active_session_id().map(str::to_string))
    }

    pub fn active_session(&self) -> Option<Session> {
        self.read(|c| c.active_session().cloned())
    }

    pub fn active_messages(&self) -> Vec<Message> {
        self.read(|c| c.active_messages().to_vec())
    }

    /// All sessions, most recently updated first
    pub fn sorted_sessions(&self) -> Vec<Session> {
        self.read(|c| c.sorted_sessions().into_iter().cloned().collect())
    }

    pub fn session(&self, session_id: &str) -> Option<Session> {
        self.read(|c| c.session(session_id).cloned())
    }

    pub fn message(&self, message_id: &str) -> Option<Message> {
        self.read(|c| {
            c.find_message(message_id)
                .map(|(session, index)| session.messages[index].clone())
        })
    }

    // ==================== Mutations ====================

    pub fn create_session(&self) -> Session {
        let session = self.inner.sessions().create_session(generate_id()).clone();
        debug!("Created session {}", session.id);
        self.schedule_save();
        session
    }

    pub fn switch_active(&self, session_id: &str) -> bool {
        self.mutate(|c| c.switch_active(session_id))
    }

    pub fn delete_session(&self, session_id: &str) -> bool {
        self.mutate(|c| c.delete_session(session_id))
    }

    pub fn rename_session(&self, session_id: &str, title: impl Into<String>) -> bool {
        let title = title.into();
        self.mutate(|c| c.rename_session(session_id, title))
    }

    /// Append to the active session, creating one if none is active.
    pub fn append_message(&self, message: NewMessage) -> Message {
        let message = self
            .inner
            .sessions()
            .append_message(message, generate_id(), generate_id);
        self.schedule_save();
        message
    }

    pub fn update_message(&self, message_id: &str, patch: MessagePatch) -> bool {
        self.mutate(|c| c.update_message(message_id, patch))
    }

    pub fn delete_message(&self, message_id: &str) -> bool {
        self.mutate(|c| c.delete_message(message_id))
    }

    pub fn truncate_from(&self, message_id: &str) -> bool {
        self.mutate(|c| c.truncate_from(message_id))
    }

    /// Drop every session and remove the persisted data.
    pub async fn clear_all(&self) {
        self.inner.sessions().clear();
        if let Some(task) = self.inner.pending_save().take() {
            task.abort();
        }
        self.inner.persistence.clear().await;
        info!("Cleared all sessions");
    }

    /// Write immediately if a debounced write is pending.
    ///
    /// Returns whether a write happened.
    pub async fn flush(&self) -> bool {
        let Some(task) = self.inner.pending_save().take() else {
            return false;
        };
        let was_pending = !task.is_finished();
        task.abort();
        if !was_pending {
            return false;
        }
        let snapshot = self.inner.snapshot();
        self.inner.persistence.save(&snapshot).await;
        debug!("Flushed {} session(s)", snapshot.len());
        true
    }

    fn mutate(&self, f: impl FnOnce(&mut SessionCollection) -> bool) -> bool {
        let changed = f(&mut self.inner.sessions());
        if changed {
            self.schedule_save();
        }
        changed
    }

    fn schedule_save(&self) {
        let mut pending = self.inner.pending_save();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let inner = Arc::clone(&self.inner);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.config.debounce).await;
            let snapshot = inner.snapshot();
            inner.persistence.save(&snapshot).await;
            debug!("Persisted {} session(s)", snapshot.len());
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_domain::{MessageStatus, Role};
    use std::time::Duration;

    /// Records every save instead of writing anywhere
    #[derive(Default)]
    struct RecordingPersistence {
        initial: Mutex<Option<SessionCollection>>,
        saves: Mutex<Vec<SessionCollection>>,
        clears: Mutex<usize>,
    }

    impl RecordingPersistence {
        fn with_initial(sessions: SessionCollection) -> Self {
            Self {
                initial: Mutex::new(Some(sessions)),
                ..Default::default()
            }
        }

        fn save_count(&self) -> usize {
            self.saves.lock().unwrap().len()
        }

        fn last_save(&self) -> SessionCollection {
            self.saves.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl SessionPersistence for RecordingPersistence {
        async fn load(&self) -> SessionCollection {
            self.initial.lock().unwrap().take().unwrap_or_default()
        }

        async fn save(&self, sessions: &SessionCollection) {
            self.saves.lock().unwrap().push(sessions.clone());
        }

        async fn clear(&self) {
            *self.clears.lock().unwrap() += 1;
        }
    }

    fn store_with(persistence: &Arc<RecordingPersistence>) -> SessionStore {
        SessionStore::new(persistence.clone(), StoreConfig::default())
    }

    async fn wait(millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_mutations_is_written_once_with_final_state() {
        let persistence = Arc::new(RecordingPersistence::default());
        let store = store_with(&persistence);

        let user = store.append_message(NewMessage::user("hello"));
        let reply = store.append_message(NewMessage::assistant_placeholder());
        for text in ["H", "Hi", "Hi there"] {
            store.update_message(
                &reply.id,
                MessagePatch::new().content(text).status(MessageStatus::Sent),
            );
            wait(100).await;
        }
        assert_eq!(persistence.save_count(), 0);

        wait(500).await;
        assert_eq!(persistence.save_count(), 1);

        let saved = persistence.last_save();
        let messages = saved.active_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, user.id);
        assert_eq!(messages[1].content, "Hi there");
    }

    #[tokio::test(start_paused = true)]
    async fn mutation_during_window_restarts_timer() {
        let persistence = Arc::new(RecordingPersistence::default());
        let store = store_with(&persistence);

        store.create_session();
        wait(400).await;
        let session = store.create_session();
        wait(400).await;
        // 800ms after the first mutation, but only 400ms after the last
        assert_eq!(persistence.save_count(), 0);

        wait(200).await;
        assert_eq!(persistence.save_count(), 1);
        assert_eq!(persistence.last_save().len(), 2);
        assert_eq!(
            persistence.last_save().active_session_id(),
            Some(session.id.as_str())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn no_op_mutations_do_not_schedule_writes() {
        let persistence = Arc::new(RecordingPersistence::default());
        let store = store_with(&persistence);

        assert!(!store.delete_session("missing"));
        assert!(!store.switch_active("missing"));
        assert!(!store.update_message("missing", MessagePatch::new().content("x")));
        assert!(!store.truncate_from("missing"));

        wait(1_000).await;
        assert_eq!(persistence.save_count(), 0);
        assert!(!store.flush().await);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_immediately_and_cancels_pending() {
        let persistence = Arc::new(RecordingPersistence::default());
        let store = store_with(&persistence);

        store.append_message(NewMessage::user("persist me"));
        assert!(store.flush().await);
        assert_eq!(persistence.save_count(), 1);

        wait(1_000).await;
        assert_eq!(persistence.save_count(), 1);
        assert!(!store.flush().await);
    }

    #[tokio::test(start_paused = true)]
    async fn load_selects_most_recent_session() {
        let mut older = Session::new("older");
        older.updated_at = 10;
        let mut newer = Session::new("newer");
        newer.updated_at = 20;
        let initial =
            SessionCollection::from_sessions(vec![older, newer], Some("older".to_string()));
        let persistence = Arc::new(RecordingPersistence::with_initial(initial));

        let store = SessionStore::load(persistence.clone(), StoreConfig::default()).await;
        assert_eq!(store.active_session_id().as_deref(), Some("newer"));
        assert_eq!(store.sorted_sessions().len(), 2);
    }

    #[tokio::test]
    async fn load_from_empty_storage_starts_empty() {
        let persistence = Arc::new(RecordingPersistence::default());
        let store = SessionStore::load(persistence, StoreConfig::default()).await;
        assert!(store.active_session().is_none());
        assert!(store.active_messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn append_without_active_session_creates_one() {
        let persistence = Arc::new(RecordingPersistence::default());
        let store = store_with(&persistence);

        let message = store.append_message(NewMessage::user("What is Rust ownership about?"));
        let session = store.active_session().unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.title, "What is Rust ownersh...");
        assert_eq!(store.message(&message.id).unwrap().role, Role::User);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_all_drops_state_and_pending_write() {
        let persistence = Arc::new(RecordingPersistence::default());
        let store = store_with(&persistence);

        store.append_message(NewMessage::user("bye"));
        store.clear_all().await;

        wait(1_000).await;
        assert_eq!(persistence.save_count(), 0);
        assert_eq!(*persistence.clears.lock().unwrap(), 1);
        assert!(store.sorted_sessions().is_empty());
        assert!(store.active_session_id().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_state() {
        let persistence = Arc::new(RecordingPersistence::default());
        let store = store_with(&persistence);
        let other = store.clone();

        let session = store.create_session();
        assert!(other.rename_session(&session.id, "renamed"));
        assert_eq!(store.session(&session.id).unwrap().title, "renamed");
    }
}
