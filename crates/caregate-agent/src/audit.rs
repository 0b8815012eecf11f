//! The government audit agent.
//!
//! An independent conversational counterparty that retrieves patient
//! records from the root coordinator over the A2A link, passing the same
//! credential challenge a human operator would face.

use crate::a2a::{run_audit_query, A2aLink};
use crate::coordinator::{AgentError, Coordinator};
use caregate_core::SessionKey;
use std::sync::Arc;
use tracing::info;

/// Session the audit agent uses against the root coordinator. Distinct
/// from any human session, so its challenge state is its own.
pub const AUDIT_SESSION: &str = "gov-audit";

pub struct AuditAgent {
    /// The audit authority's copy of the shared secret.
    secret: String,
}

impl AuditAgent {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Run the full audit exchange against the root coordinator and
    /// return the final reply (the record listing when authorized).
    pub async fn run(&self, root: Arc<Coordinator>) -> Result<String, AgentError> {
        info!("starting A2A audit exchange");
        let link = A2aLink::new(root, SessionKey::new(AUDIT_SESSION));
        run_audit_query(&link, &self.secret).await
    }
}
