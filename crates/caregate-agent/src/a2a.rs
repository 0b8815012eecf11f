//! A2A transport adapter.
//!
//! A second agent drives the root coordinator's conversation as if it were
//! the user: one synchronous turn per `send`, final text back. The
//! disclosure protocol on the other side is the same one the terminal
//! drives; the only difference is the transport soliciting the
//! credential.

use crate::coordinator::{AgentError, Coordinator};
use caregate_core::{Requester, SessionKey};
use std::sync::Arc;
use tracing::{debug, info};

/// Keywords that mark a reply as a credential challenge.
const CHALLENGE_KEYWORDS: [&str; 2] = ["code", "secret"];

/// True if the root's reply is asking for the shared secret.
pub fn mentions_challenge(response: &str) -> bool {
    let lowered = response.to_lowercase();
    CHALLENGE_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// A live link from a remote agent into the root coordinator's
/// conversation, bound to one session.
pub struct A2aLink {
    root: Arc<Coordinator>,
    session: SessionKey,
}

impl A2aLink {
    /// Bind to (and if needed create) a session on the root coordinator.
    /// Session creation is idempotent; binding twice is harmless.
    pub fn new(root: Arc<Coordinator>, session: SessionKey) -> Self {
        root.ensure_session(&session);
        Self { root, session }
    }

    pub fn session(&self) -> &SessionKey {
        &self.session
    }

    /// Submit one message as a turn and await the final text. Any turn
    /// failure or empty final text surfaces as a transport error; the
    /// target session's own state is never corrupted by a failed send.
    pub async fn send(&self, message: &str) -> Result<String, AgentError> {
        debug!(session = %self.session, "a2a send");
        match self
            .root
            .handle_turn(&self.session, message, Requester::Agent)
            .await
        {
            Ok(text) if text.trim().is_empty() => Err(AgentError::Transport(
                "no final response received".to_string(),
            )),
            Ok(text) => Ok(text),
            Err(e) => Err(AgentError::Transport(format!("send failed: {e}"))),
        }
    }
}

/// The scripted two-step audit negotiation:
/// 1. ask the root to show records;
/// 2. if the reply is a credential challenge, answer with the shared
///    secret on the immediately following turn and return that reply;
///    otherwise return the first reply as-is.
pub async fn run_audit_query(link: &A2aLink, secret: &str) -> Result<String, AgentError> {
    info!(session = %link.session(), "a2a audit: requesting records");
    let first = link.send("show records").await?;

    if mentions_challenge(&first) {
        info!(session = %link.session(), "a2a audit: challenge received, supplying credential");
        return link.send(secret).await;
    }

    Ok(first)
}
