//! Caregate agent runtime: routing coordinator, specialist roster,
//! disclosure challenge protocol, intake sub-flow, and the A2A transport
//! adapter used by the audit agent.

pub mod a2a;
pub mod audit;
pub mod coordinator;
pub mod disclosure;
pub mod intake;
pub mod routing;
pub mod session;
pub mod specialist;

pub use a2a::{run_audit_query, A2aLink};
pub use audit::AuditAgent;
pub use coordinator::{AgentError, Coordinator, CoordinatorConfig};
pub use disclosure::DisclosureGate;
pub use intake::{parse_age, parse_name, parse_weight, IntakeForm, ValidationError};
pub use routing::{IntentRouter, KeywordRouter};
pub use session::{Session, SessionRegistry};
pub use specialist::Specialist;
