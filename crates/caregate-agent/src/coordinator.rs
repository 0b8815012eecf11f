//! The routing coordinator.
//!
//! Owns the active turn for every session. Each inbound utterance is
//! processed to completion (pending-credential resolution, root-level
//! disclosure short-circuit, or specialist delegation with sentinel
//! interception) before the next utterance on that session is admitted.

use crate::disclosure::DisclosureGate;
use crate::intake::IntakeForm;
use crate::routing::{IntentRouter, KeywordRouter};
use crate::session::SessionRegistry;
use crate::specialist::Specialist;
use caregate_core::{
    is_disclosure_request, PatientRecord, Requester, SessionKey, SessionState, SENTINEL_FORWARD,
};
use caregate_llm::{LlmError, LlmProvider, LlmRequest};
use caregate_store::{RecordStore, SessionStateStore, StoreError};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("language engine error: {0}")]
    Llm(#[from] LlmError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    pub model: String,
    /// The shared secret gating record disclosure. Static for the process
    /// lifetime; never rotated within a session.
    pub shared_secret: String,
    pub max_tokens: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            model: caregate_llm::anthropic::DEFAULT_MODEL.to_string(),
            shared_secret: "0864".to_string(),
            max_tokens: 1024,
        }
    }
}

pub struct Coordinator {
    provider: Arc<dyn LlmProvider>,
    records: Arc<RecordStore>,
    state: SessionStateStore,
    sessions: SessionRegistry,
    roster: Vec<Specialist>,
    router: Box<dyn IntentRouter>,
    gate: DisclosureGate,
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        records: Arc<RecordStore>,
        config: CoordinatorConfig,
    ) -> Self {
        let gate = DisclosureGate::new(config.shared_secret.clone(), records.clone());
        Self {
            provider,
            records,
            state: SessionStateStore::in_memory(),
            sessions: SessionRegistry::new(),
            roster: Specialist::roster(),
            router: Box::new(KeywordRouter::new()),
            gate,
            config,
        }
    }

    /// Replace the fallback router with an external intent classifier.
    pub fn with_router(mut self, router: Box<dyn IntentRouter>) -> Self {
        self.router = router;
        self
    }

    /// Replace the session state store (e.g. a different backend chain).
    pub fn with_session_state(mut self, state: SessionStateStore) -> Self {
        self.state = state;
        self
    }

    pub fn records(&self) -> &Arc<RecordStore> {
        &self.records
    }

    /// Create the session if it does not exist. Idempotent: an existing
    /// session is left untouched, never an error.
    pub fn ensure_session(&self, key: &SessionKey) {
        self.sessions.get_or_create(key);
    }

    /// Current session state; empty for an unknown session.
    pub fn session_state(&self, key: &SessionKey) -> SessionState {
        self.state.get(key)
    }

    /// Persist a completed intake and populate session state. A failed
    /// insert is returned to the caller and leaves the session fields
    /// unset; the conversation itself continues.
    pub async fn complete_intake(
        &self,
        key: &SessionKey,
        form: &IntakeForm,
    ) -> Result<PatientRecord, AgentError> {
        let record = self
            .records
            .insert(&form.patient_name, form.patient_age, form.patient_weight)
            .await?;
        self.state.set(key, form.session_state());
        info!(session = %key, record_id = record.id, "intake complete");
        Ok(record)
    }

    /// Process one utterance for one session, returning the text for
    /// whichever caller (terminal or A2A link) drove the turn.
    pub async fn handle_turn(
        &self,
        key: &SessionKey,
        input: &str,
        requester: Requester,
    ) -> Result<String, AgentError> {
        let session = self.sessions.get_or_create(key);
        let _turn = session.lock_turn().await;

        // A pending challenge claims the whole turn: the input is the
        // credential, nothing else. Credential turns are kept out of the
        // transcript so session context never crosses the disclosure path.
        if self.gate.is_pending(key) {
            let outcome = self.gate.resolve(key, input.trim(), requester).await;
            return Ok(outcome.into_text());
        }

        // Root-level short-circuit: a disclosure request never reaches a
        // specialist.
        if is_disclosure_request(input) {
            return Ok(self.gate.issue(key));
        }

        // Delegate to a specialist.
        let specialist = self.router.select(input, &self.roster);
        let mut system = specialist.instruction.clone();
        if let Some(context) = self.state.get(key).context_summary() {
            system.push_str("\n\nKnown session context:\n");
            system.push_str(&context);
        }

        session.push_user(input).await;
        let request = LlmRequest {
            model: self.config.model.clone(),
            system: Some(system),
            messages: session.messages().await,
            max_tokens: self.config.max_tokens,
        };
        let reply = self.provider.complete(request).await?;
        let reply = reply.trim();

        // Sentinel anywhere in the reply means the specialist handed the
        // turn back; the token itself must never reach the caller.
        if reply.contains(SENTINEL_FORWARD) {
            info!(
                session = %key,
                specialist = specialist.name,
                "sentinel intercepted; entering disclosure protocol"
            );
            return Ok(self.gate.issue(key));
        }

        session.push_assistant(reply).await;
        Ok(reply.to_string())
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("provider", &self.provider.name())
            .field("model", &self.config.model)
            .field("specialists", &self.roster.len())
            .finish()
    }
}
