//! In-memory store of active checklist sessions, keyed by chat.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use crate::models::session::ChecklistSession;

/// Result of attempting to create a session for a chat.
#[derive(Debug)]
pub enum CreateOutcome {
    /// No session existed; the new one was stored.
    Created,
    /// The chat already has a session; nothing was stored. The existing
    /// session is returned for the "already running" reply.
    Busy(Box<ChecklistSession>),
}

/// One session per chat, behind an async mutex.
///
/// All accessors lock for the duration of the call only; handlers never
/// hold the lock across a Telegram API await.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, ChecklistSession>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session unless the chat already has one.
    pub async fn create(&self, session: ChecklistSession) -> CreateOutcome {
        let mut guard = self.sessions.lock().await;
        if let Some(existing) = guard.get(&session.chat_id) {
            return CreateOutcome::Busy(Box::new(existing.clone()));
        }
        debug!(chat_id = session.chat_id, session_id = %session.session_id, "session created");
        guard.insert(session.chat_id, session);
        CreateOutcome::Created
    }

    /// Whether the chat has an active session.
    pub async fn contains(&self, chat_id: i64) -> bool {
        self.sessions.lock().await.contains_key(&chat_id)
    }

    /// Clone the chat's session, if any.
    pub async fn snapshot(&self, chat_id: i64) -> Option<ChecklistSession> {
        self.sessions.lock().await.get(&chat_id).cloned()
    }

    /// Run a closure against the chat's session under the lock.
    ///
    /// Returns `None` when the chat has no session.
    pub async fn with_mut<T>(
        &self,
        chat_id: i64,
        f: impl FnOnce(&mut ChecklistSession) -> T,
    ) -> Option<T> {
        self.sessions.lock().await.get_mut(&chat_id).map(f)
    }

    /// Remove and return the chat's session.
    pub async fn remove(&self, chat_id: i64) -> Option<ChecklistSession> {
        let removed = self.sessions.lock().await.remove(&chat_id);
        if let Some(session) = &removed {
            debug!(chat_id, session_id = %session.session_id, "session removed");
        }
        removed
    }

    /// Remove and return every session idle for longer than `timeout`.
    pub async fn take_expired(&self, timeout: Duration) -> Vec<ChecklistSession> {
        let mut guard = self.sessions.lock().await;
        let expired_chats: Vec<i64> = guard
            .iter()
            .filter(|(_, session)| session.is_expired(timeout))
            .map(|(chat_id, _)| *chat_id)
            .collect();
        expired_chats
            .into_iter()
            .filter_map(|chat_id| guard.remove(&chat_id))
            .collect()
    }

    /// Chat ids of all active sessions.
    pub async fn active_chats(&self) -> Vec<i64> {
        self.sessions.lock().await.keys().copied().collect()
    }

    /// Number of active sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no sessions are active.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
