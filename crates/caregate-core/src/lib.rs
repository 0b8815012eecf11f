//! Core types for Caregate

pub mod protocol;
pub mod types;

pub use protocol::{
    is_disclosure_request, is_sentinel, DisclosureAttempt, DisclosureOutcome, Requester,
    SENTINEL_FORWARD,
};
pub use types::{Message, PatientRecord, Role, SessionKey, SessionState};
