//! The session collection aggregate.
//!
//! [`SessionCollection`] holds every session plus the nullable active
//! pointer, and enforces:
//!
//! - the active id, when set, always references an existing session
//! - deleting the active session repoints to the most recently updated
//!   remaining session (or `None`)
//! - every mutation of a session or one of its messages bumps that
//!   session's `updated_at`
//!
//! All operations are synchronous and return whether anything changed,
//! so callers can decide whether a persistence write is due.

use super::entities::{Message, MessagePatch, NewMessage, Role, Session};
use super::title::derive_title;

/// Every session owned by the process, in insertion order (newest first)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionCollection {
    sessions: Vec<Session>,
    active_session_id: Option<String>,
}

impl SessionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from loaded sessions.
    ///
    /// A stale or missing active id is replaced by the most recently
    /// updated session.
    pub fn from_sessions(sessions: Vec<Session>, active_session_id: Option<String>) -> Self {
        let mut collection = Self {
            sessions,
            active_session_id: None,
        };
        collection.active_session_id = match active_session_id {
            Some(id) if collection.contains(&id) => Some(id),
            _ => collection.most_recent_id(),
        };
        collection
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn into_sessions(self) -> Vec<Session> {
        self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active_session_id.as_deref()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.iter().any(|s| s.id == session_id)
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    fn active_index(&self) -> Option<usize> {
        let active = self.active_session_id.as_deref()?;
        self.sessions.iter().position(|s| s.id == active)
    }

    fn session_mut(&mut self, session_id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == session_id)
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active_session_id
            .as_deref()
            .and_then(|id| self.session(id))
    }

    pub fn active_messages(&self) -> &[Message] {
        self.active_session()
            .map(|s| s.messages.as_slice())
            .unwrap_or(&[])
    }

    /// Sessions ordered by `updated_at`, newest first. The sort is stable,
    /// so ties keep insertion order.
    pub fn sorted_sessions(&self) -> Vec<&Session> {
        let mut sorted: Vec<&Session> = self.sessions.iter().collect();
        sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sorted
    }

    /// Id of the most recently updated session
    pub fn most_recent_id(&self) -> Option<String> {
        self.sorted_sessions().first().map(|s| s.id.clone())
    }

    /// Locate a message anywhere in the collection
    pub fn find_message(&self, message_id: &str) -> Option<(&Session, usize)> {
        self.sessions
            .iter()
            .find_map(|s| s.position_of(message_id).map(|idx| (s, idx)))
    }

    fn find_message_mut(&mut self, message_id: &str) -> Option<(&mut Session, usize)> {
        self.sessions
            .iter_mut()
            .find_map(|s| s.position_of(message_id).map(|idx| (s, idx)))
    }

    /// Insert a new empty session at the front and make it active
    pub fn create_session(&mut self, session_id: String) -> &Session {
        self.sessions.insert(0, Session::new(session_id.clone()));
        self.active_session_id = Some(session_id);
        &self.sessions[0]
    }

    /// Repoint the active session. Unknown ids are ignored.
    pub fn switch_active(&mut self, session_id: &str) -> bool {
        if !self.contains(session_id) {
            return false;
        }
        self.active_session_id = Some(session_id.to_string());
        true
    }

    pub fn delete_session(&mut self, session_id: &str) -> bool {
        let Some(index) = self.sessions.iter().position(|s| s.id == session_id) else {
            return false;
        };
        self.sessions.remove(index);
        if self.active_session_id.as_deref() == Some(session_id) {
            self.active_session_id = self.most_recent_id();
        }
        true
    }

    pub fn rename_session(&mut self, session_id: &str, title: impl Into<String>) -> bool {
        let Some(session) = self.session_mut(session_id) else {
            return false;
        };
        session.title = title.into();
        session.touch();
        true
    }

    /// Append a message to the active session, creating one first if none
    /// is active. Derives the title when the first message is a user message.
    pub fn append_message(
        &mut self,
        message: NewMessage,
        message_id: String,
        new_session_id: impl FnOnce() -> String,
    ) -> Message {
        let index = match self.active_index() {
            Some(index) => index,
            None => {
                self.create_session(new_session_id());
                0
            }
        };
        let session = &mut self.sessions[index];

        let derived_title = (session.messages.is_empty() && message.role == Role::User)
            .then(|| derive_title(&message.content));
        let message = message.into_message(message_id);
        session.messages.push(message.clone());
        session.touch();
        if let Some(title) = derived_title {
            session.title = title;
        }
        message
    }

    /// Merge a partial update into the matching message
    pub fn update_message(&mut self, message_id: &str, patch: MessagePatch) -> bool {
        let Some((session, index)) = self.find_message_mut(message_id) else {
            return false;
        };
        session.messages[index].apply(patch);
        session.touch();
        true
    }

    pub fn delete_message(&mut self, message_id: &str) -> bool {
        let Some((session, index)) = self.find_message_mut(message_id) else {
            return false;
        };
        session.messages.remove(index);
        session.touch();
        true
    }

    /// Remove the matching message and everything after it
    pub fn truncate_from(&mut self, message_id: &str) -> bool {
        let Some((session, index)) = self.find_message_mut(message_id) else {
            return false;
        };
        session.messages.truncate(index);
        session.touch();
        true
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
        self.active_session_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::entities::MessageStatus;
    use std::collections::HashSet;

    fn ids() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("id-{n}")
        }
    }

    fn append(c: &mut SessionCollection, next: &mut impl FnMut() -> String, msg: NewMessage) -> Message {
        let id = next();
        c.append_message(msg, id, || "implicit".to_string())
    }

    #[test]
    fn append_without_active_session_creates_one() {
        let mut c = SessionCollection::new();
        let mut next = ids();
        append(&mut c, &mut next, NewMessage::user("hi"));

        assert_eq!(c.len(), 1);
        assert_eq!(c.active_session_id(), Some("implicit"));
        assert_eq!(c.active_messages().len(), 1);
        assert_eq!(c.active_session().unwrap().title, "hi");
    }

    #[test]
    fn appended_ids_are_pairwise_distinct() {
        let mut c = SessionCollection::new();
        let mut next = ids();
        for i in 0..50 {
            append(&mut c, &mut next, NewMessage::user(format!("m{i}")));
        }
        let unique: HashSet<&str> = c.active_messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(unique.len(), 50);
    }

    #[test]
    fn title_only_derived_from_first_user_message() {
        let mut c = SessionCollection::new();
        let mut next = ids();
        c.create_session("s".into());
        append(&mut c, &mut next, NewMessage::assistant_placeholder());
        append(&mut c, &mut next, NewMessage::user("later question"));
        assert_eq!(c.active_session().unwrap().title, crate::DEFAULT_SESSION_TITLE);

        c.create_session("t".into());
        append(&mut c, &mut next, NewMessage::user("a very long first question here"));
        append(&mut c, &mut next, NewMessage::user("second"));
        assert_eq!(c.active_session().unwrap().title, "a very long first qu...");
    }

    #[test]
    fn create_session_inserts_at_front_and_activates() {
        let mut c = SessionCollection::new();
        c.create_session("a".into());
        c.create_session("b".into());
        assert_eq!(c.sessions()[0].id, "b");
        assert_eq!(c.active_session_id(), Some("b"));
    }

    #[test]
    fn switch_to_unknown_is_noop() {
        let mut c = SessionCollection::new();
        c.create_session("a".into());
        assert!(!c.switch_active("nope"));
        assert_eq!(c.active_session_id(), Some("a"));
    }

    #[test]
    fn deleting_active_repoints_to_most_recently_updated() {
        let mut c = SessionCollection::from_sessions(
            vec![
                Session { updated_at: 10, ..Session::new("old") },
                Session { updated_at: 30, ..Session::new("newest") },
                Session { updated_at: 20, ..Session::new("middle") },
            ],
            Some("middle".into()),
        );
        assert!(c.delete_session("middle"));
        assert_eq!(c.active_session_id(), Some("newest"));

        assert!(c.delete_session("newest"));
        assert_eq!(c.active_session_id(), Some("old"));

        assert!(c.delete_session("old"));
        assert_eq!(c.active_session_id(), None);
    }

    #[test]
    fn deleting_inactive_keeps_pointer() {
        let mut c = SessionCollection::new();
        c.create_session("a".into());
        c.create_session("b".into());
        assert!(c.delete_session("a"));
        assert_eq!(c.active_session_id(), Some("b"));
        assert!(!c.delete_session("a"));
    }

    #[test]
    fn truncate_keeps_strict_prefix() {
        let mut c = SessionCollection::new();
        let mut next = ids();
        let msgs: Vec<Message> = (0..5)
            .map(|i| append(&mut c, &mut next, NewMessage::user(format!("m{i}"))))
            .collect();

        assert!(c.truncate_from(&msgs[2].id));
        let remaining: Vec<&str> = c.active_messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(remaining, vec![msgs[0].id.as_str(), msgs[1].id.as_str()]);
    }

    #[test]
    fn truncate_unknown_id_is_noop() {
        let mut c = SessionCollection::new();
        let mut next = ids();
        append(&mut c, &mut next, NewMessage::user("a"));
        append(&mut c, &mut next, NewMessage::user("b"));
        assert!(!c.truncate_from("missing"));
        assert_eq!(c.active_messages().len(), 2);
    }

    #[test]
    fn update_and_delete_message() {
        let mut c = SessionCollection::new();
        let mut next = ids();
        let msg = append(&mut c, &mut next, NewMessage::assistant_placeholder());

        assert!(c.update_message(
            &msg.id,
            MessagePatch::new().content("done").status(MessageStatus::Sent)
        ));
        assert_eq!(c.active_messages()[0].content, "done");
        assert!(!c.update_message("missing", MessagePatch::new().content("x")));

        assert!(c.delete_message(&msg.id));
        assert!(c.active_messages().is_empty());
        assert!(!c.delete_message(&msg.id));
    }

    #[test]
    fn updates_reach_messages_in_inactive_sessions() {
        let mut c = SessionCollection::new();
        let mut next = ids();
        c.create_session("first".into());
        let msg = append(&mut c, &mut next, NewMessage::assistant_placeholder());
        c.create_session("second".into());

        assert!(c.update_message(&msg.id, MessagePatch::new().content("late")));
        assert_eq!(c.session("first").unwrap().messages[0].content, "late");
    }

    #[test]
    fn sorted_sessions_newest_first() {
        let c = SessionCollection::from_sessions(
            vec![
                Session { updated_at: 1, ..Session::new("a") },
                Session { updated_at: 3, ..Session::new("b") },
                Session { updated_at: 2, ..Session::new("c") },
            ],
            None,
        );
        let order: Vec<&str> = c.sorted_sessions().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(c.active_session_id(), Some("b"));
    }

    #[test]
    fn from_sessions_keeps_valid_active_pointer() {
        let c = SessionCollection::from_sessions(
            vec![
                Session { updated_at: 1, ..Session::new("a") },
                Session { updated_at: 3, ..Session::new("b") },
            ],
            Some("a".into()),
        );
        assert_eq!(c.active_session_id(), Some("a"));
    }
}
