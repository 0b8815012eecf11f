//! Disclosure-protocol value types and the sentinel-forwarding convention.
//!
//! Specialists are never trusted with record disclosure. When a specialist
//! recognizes a records-access request it must emit [`SENTINEL_FORWARD`]
//! verbatim and nothing else; the coordinator intercepts the sentinel and
//! substitutes the challenge protocol's own output. The sentinel is a
//! compile-time constant and must never reach an end caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved control token a specialist emits to hand its turn back to the
/// root coordinator. Not configurable at runtime.
pub const SENTINEL_FORWARD: &str = "__FORWARD_TO_ROOT__";

/// Phrases that express records-access intent. Matched case-insensitively
/// as substrings of the inbound utterance.
pub const DISCLOSURE_PHRASES: [&str; 3] = ["show records", "display records", "view records"];

/// True if the specialist output is exactly the sentinel (modulo surrounding
/// whitespace). The comparison is byte-for-byte after trimming.
pub fn is_sentinel(output: &str) -> bool {
    output.trim() == SENTINEL_FORWARD
}

/// True if the utterance expresses intent to view patient records.
pub fn is_disclosure_request(input: &str) -> bool {
    let lowered = input.to_lowercase();
    DISCLOSURE_PHRASES.iter().any(|p| lowered.contains(p))
}

/// Who is driving the current challenge/response exchange.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Requester {
    Human,
    Agent,
}

impl std::fmt::Display for Requester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Agent => write!(f, "agent"),
        }
    }
}

/// Outcome of resolving a pending challenge. `Denied` is a normal value,
/// never an error; the wording is identical for human and agent requesters.
#[derive(Clone, Debug, PartialEq)]
pub enum DisclosureOutcome {
    /// Access granted; carries the rendered record listing.
    Granted(String),
    /// Access denied; carries the fixed denial message.
    Denied(String),
}

impl DisclosureOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// The text returned to whichever caller drove the exchange.
    pub fn into_text(self) -> String {
        match self {
            Self::Granted(text) | Self::Denied(text) => text,
        }
    }
}

/// One challenge/response exchange, for audit logging. Not persisted.
#[derive(Clone, Debug)]
pub struct DisclosureAttempt {
    pub requester: Requester,
    pub granted: bool,
    pub at: DateTime<Utc>,
}

impl DisclosureAttempt {
    pub fn new(requester: Requester, granted: bool) -> Self {
        Self {
            requester,
            granted,
            at: Utc::now(),
        }
    }
}
