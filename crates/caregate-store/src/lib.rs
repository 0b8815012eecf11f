//! Persistence for Caregate: the patient record store and the per-session
//! state store.

pub mod record;
pub mod session_state;

pub use record::{RecordStore, StoreError};
pub use session_state::{
    InMemoryBackend, NoopBackend, SessionStateBackend, SessionStateStore,
};
