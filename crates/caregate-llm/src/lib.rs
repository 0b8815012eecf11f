//! Language-engine boundary for Caregate.
//!
//! The coordinator treats natural-language understanding as an external
//! collaborator reached through [`LlmProvider`]. Only final turn text
//! crosses this boundary; the control protocol around it lives in
//! caregate-agent.

pub mod anthropic;
pub mod provider;
pub mod scripted;

pub use anthropic::AnthropicProvider;
pub use provider::{LlmError, LlmProvider, LlmRequest, LlmResult};
pub use scripted::{ScriptedProvider, ScriptedReply};
