//! Per-session state store with one-time backend selection.
//!
//! The coordinator cannot assume a single session-management
//! implementation, so the store probes an ordered list of candidate
//! backends once at construction and keeps the first that reports ready.
//! If none does, it degrades to a no-op backend: state becomes
//! best-effort and the conversation layer never sees an error from this
//! store. `get` on an unknown session returns empty state, never a
//! failure.

use caregate_core::{SessionKey, SessionState};
use dashmap::DashMap;
use tracing::{debug, warn};

/// A backing implementation for session-scoped state.
pub trait SessionStateBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Capability check, called once during store construction.
    fn probe(&self) -> bool;

    /// Current state for the session; empty if the session is unknown.
    fn get(&self, key: &SessionKey) -> SessionState;

    /// Merge the partial state into the session's state, last write wins
    /// per field.
    fn set(&self, key: &SessionKey, partial: SessionState);
}

/// Default backend: process-local concurrent map.
#[derive(Default)]
pub struct InMemoryBackend {
    sessions: DashMap<SessionKey, SessionState>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStateBackend for InMemoryBackend {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn probe(&self) -> bool {
        true
    }

    fn get(&self, key: &SessionKey) -> SessionState {
        self.sessions
            .get(key)
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn set(&self, key: &SessionKey, partial: SessionState) {
        self.sessions.entry(key.clone()).or_default().merge(partial);
    }
}

/// Terminal fallback: discards writes, reads empty. Selected only when no
/// candidate backend probes ready.
pub struct NoopBackend;

impl SessionStateBackend for NoopBackend {
    fn name(&self) -> &str {
        "noop"
    }

    fn probe(&self) -> bool {
        true
    }

    fn get(&self, _key: &SessionKey) -> SessionState {
        SessionState::default()
    }

    fn set(&self, _key: &SessionKey, _partial: SessionState) {}
}

/// The session state store the coordinator talks to. Holds exactly one
/// backend, chosen at construction.
pub struct SessionStateStore {
    backend: Box<dyn SessionStateBackend>,
}

impl SessionStateStore {
    /// Probe candidates in order and keep the first that reports ready.
    /// Falls back to [`NoopBackend`] when none does: state degrades to
    /// best-effort rather than failing the conversation.
    pub fn select(candidates: Vec<Box<dyn SessionStateBackend>>) -> Self {
        for backend in candidates {
            if backend.probe() {
                debug!(backend = backend.name(), "session state backend selected");
                return Self { backend };
            }
            debug!(backend = backend.name(), "session state backend not ready");
        }
        warn!("no session state backend available; state is best-effort only");
        Self {
            backend: Box::new(NoopBackend),
        }
    }

    /// The usual configuration: a single in-memory backend.
    pub fn in_memory() -> Self {
        Self::select(vec![Box::new(InMemoryBackend::new())])
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn get(&self, key: &SessionKey) -> SessionState {
        self.backend.get(key)
    }

    pub fn set(&self, key: &SessionKey, partial: SessionState) {
        self.backend.set(key, partial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A backend that refuses to come up, for probe-order tests.
    struct UnavailableBackend;

    impl SessionStateBackend for UnavailableBackend {
        fn name(&self) -> &str {
            "unavailable"
        }
        fn probe(&self) -> bool {
            false
        }
        fn get(&self, _key: &SessionKey) -> SessionState {
            unreachable!("never selected")
        }
        fn set(&self, _key: &SessionKey, _partial: SessionState) {
            unreachable!("never selected")
        }
    }

    #[test]
    fn get_without_set_returns_empty() {
        let store = SessionStateStore::in_memory();
        let state = store.get(&SessionKey::new("unseen"));
        assert!(state.is_empty());
    }

    #[test]
    fn set_then_get_roundtrip() {
        let store = SessionStateStore::in_memory();
        let key = SessionKey::new("s1");
        store.set(
            &key,
            SessionState {
                patient_name: Some("Jane Doe".into()),
                interactant_name: Some("Jane Doe".into()),
                ..Default::default()
            },
        );
        let state = store.get(&key);
        assert_eq!(state.patient_name.as_deref(), Some("Jane Doe"));
        assert_eq!(state.interactant_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn set_merges_per_field() {
        let store = SessionStateStore::in_memory();
        let key = SessionKey::new("s1");
        store.set(
            &key,
            SessionState {
                patient_name: Some("Jane".into()),
                patient_age: Some(29),
                ..Default::default()
            },
        );
        store.set(
            &key,
            SessionState {
                patient_age: Some(30),
                ..Default::default()
            },
        );
        let state = store.get(&key);
        assert_eq!(state.patient_age, Some(30));
        assert_eq!(state.patient_name.as_deref(), Some("Jane"));
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStateStore::in_memory();
        store.set(
            &SessionKey::new("a"),
            SessionState {
                patient_name: Some("Alice".into()),
                ..Default::default()
            },
        );
        assert!(store.get(&SessionKey::new("b")).is_empty());
    }

    #[test]
    fn selection_skips_unready_backends() {
        let store = SessionStateStore::select(vec![
            Box::new(UnavailableBackend),
            Box::new(InMemoryBackend::new()),
        ]);
        assert_eq!(store.backend_name(), "in-memory");
    }

    #[test]
    fn selection_falls_back_to_noop() {
        let store = SessionStateStore::select(vec![Box::new(UnavailableBackend)]);
        assert_eq!(store.backend_name(), "noop");

        // Best-effort semantics: writes are accepted and discarded.
        let key = SessionKey::new("s1");
        store.set(
            &key,
            SessionState {
                patient_name: Some("Jane".into()),
                ..Default::default()
            },
        );
        assert!(store.get(&key).is_empty());
    }
}
