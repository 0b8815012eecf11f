//! Conversation sessions and the session registry.

use caregate_core::{Message, SessionKey};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// One conversation: a transcript plus a per-session turn lock.
///
/// The turn lock serializes utterances within a session: one turn runs to
/// completion (including any disclosure detour or A2A round trip) before
/// the next is admitted. Distinct sessions never contend for each other's
/// lock.
pub struct Session {
    pub key: SessionKey,
    messages: RwLock<Vec<Message>>,
    turn_lock: Mutex<()>,
}

impl Session {
    pub fn new(key: SessionKey) -> Self {
        Self {
            key,
            messages: RwLock::new(Vec::new()),
            turn_lock: Mutex::new(()),
        }
    }

    pub async fn lock_turn(&self) -> MutexGuard<'_, ()> {
        self.turn_lock.lock().await
    }

    pub async fn push_user(&self, content: &str) {
        self.messages.write().await.push(Message::user(content));
    }

    pub async fn push_assistant(&self, content: &str) {
        self.messages.write().await.push(Message::assistant(content));
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }
}

/// Registry of active sessions. Thread-safe, concurrent access.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionKey, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn get_or_create(&self, key: &SessionKey) -> Arc<Session> {
        self.sessions
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Session::new(key.clone())))
            .clone()
    }

    pub fn get(&self, key: &SessionKey) -> Option<Arc<Session>> {
        self.sessions.get(key).map(|s| s.clone())
    }

    pub fn list(&self) -> Vec<SessionKey> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    pub fn remove(&self, key: &SessionKey) -> Option<Arc<Session>> {
        self.sessions.remove(key).map(|(_, s)| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registry_get_or_create_is_idempotent() {
        let registry = SessionRegistry::new();
        let key = SessionKey::new("s1");
        let a = registry.get_or_create(&key);
        a.push_user("hello").await;
        let b = registry.get_or_create(&key);
        assert_eq!(b.message_count().await, 1);
        assert_eq!(registry.list().len(), 1);
    }

    #[tokio::test]
    async fn transcript_preserves_order() {
        let session = Session::new(SessionKey::new("s1"));
        session.push_user("question").await;
        session.push_assistant("answer").await;
        let messages = session.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "question");
        assert_eq!(messages[1].content, "answer");
    }

    #[tokio::test]
    async fn remove_drops_the_session() {
        let registry = SessionRegistry::new();
        let key = SessionKey::new("s1");
        registry.get_or_create(&key);
        assert!(registry.remove(&key).is_some());
        assert!(registry.get(&key).is_none());
    }
}
