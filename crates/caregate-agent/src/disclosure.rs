//! The disclosure challenge protocol.
//!
//! State machine per session: `Idle -> ChallengeIssued -> {Granted, Denied}`.
//! A records-access request (root short-circuit or forwarded sentinel)
//! issues a single-shot challenge; the very next input on that session is
//! taken as the credential. Exact match against the shared secret grants
//! and renders the full record listing; anything else denies with a fixed
//! message and resets to idle. The protocol never special-cases its
//! caller: human terminal and A2A agent drive the identical code path.

use caregate_core::{
    DisclosureAttempt, DisclosureOutcome, PatientRecord, Requester, SessionKey,
};
use caregate_store::RecordStore;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Challenge text. Contains the word "code", the keyword the audit
/// agent's scripted negotiation looks for.
pub const CHALLENGE_PROMPT: &str =
    "Security check: what is the secret code to access patient records?";

/// Fixed denial message, worded identically for human and agent
/// requesters so a failed attempt leaks nothing about why it failed.
pub const ACCESS_DENIED: &str =
    "Access denied: invalid security code. Please provide the correct code to view patient records.";

/// Rendered when access is granted but the store holds nothing; callers
/// must be able to tell "granted, nothing to show" from "denied".
pub const NO_RECORDS: &str = "No patient records found.";

pub struct DisclosureGate {
    secret: String,
    records: Arc<RecordStore>,
    pending: DashMap<SessionKey, ()>,
}

impl DisclosureGate {
    pub fn new(secret: impl Into<String>, records: Arc<RecordStore>) -> Self {
        Self {
            secret: secret.into(),
            records,
            pending: DashMap::new(),
        }
    }

    /// Whether this session has a challenge awaiting its credential.
    pub fn is_pending(&self, key: &SessionKey) -> bool {
        self.pending.contains_key(key)
    }

    /// `Idle -> ChallengeIssued` for this session. Returns the challenge
    /// text to hand back to the caller.
    pub fn issue(&self, key: &SessionKey) -> String {
        self.pending.insert(key.clone(), ());
        info!(session = %key, "disclosure challenge issued");
        CHALLENGE_PROMPT.to_string()
    }

    /// `ChallengeIssued -> {Granted, Denied}`. Resolves the pending
    /// challenge with the supplied credential. The pending state is
    /// cleared up front; the machine never stays in `ChallengeIssued`
    /// past this turn, even if the record read fails.
    pub async fn resolve(
        &self,
        key: &SessionKey,
        credential: &str,
        requester: Requester,
    ) -> DisclosureOutcome {
        self.pending.remove(key);

        if credential != self.secret {
            let attempt = DisclosureAttempt::new(requester, false);
            warn!(
                session = %key,
                requester = %attempt.requester,
                at = %attempt.at,
                "records access denied: invalid security code"
            );
            return DisclosureOutcome::Denied(ACCESS_DENIED.to_string());
        }

        match self.records.list_all().await {
            Ok(records) => {
                let attempt = DisclosureAttempt::new(requester, true);
                info!(
                    session = %key,
                    requester = %attempt.requester,
                    count = records.len(),
                    at = %attempt.at,
                    "records access granted"
                );
                DisclosureOutcome::Granted(render_records(&records))
            }
            Err(e) => {
                // Valid credential but the read failed: deny with a
                // diagnostic rather than leave the challenge dangling.
                let attempt = DisclosureAttempt::new(requester, false);
                warn!(
                    session = %key,
                    requester = %attempt.requester,
                    at = %attempt.at,
                    error = %e,
                    "records access failed at read time"
                );
                DisclosureOutcome::Denied(format!(
                    "Access denied: patient records are unavailable right now ({e})."
                ))
            }
        }
    }
}

/// Plain-text table of all records, ordered as the store returns them.
pub fn render_records(records: &[PatientRecord]) -> String {
    if records.is_empty() {
        return NO_RECORDS.to_string();
    }

    let mut out = String::from("Patient records\n");
    out.push_str(&format!(
        "{:<5} {:<25} {:<6} {:<8} {}\n",
        "ID", "Name", "Age", "Weight", "Created"
    ));
    for record in records {
        let weight = record
            .weight
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<5} {:<25} {:<6} {:<8} {}\n",
            record.id,
            record.name,
            record.age,
            weight,
            record.created_at.format("%Y-%m-%d %H:%M:%S")
        ));
    }
    out
}
