//! ScriptedProvider — deterministic LLM responses for testing
//!
//! Implements the LlmProvider trait, returning canned responses so the
//! coordinator's routing, sentinel interception, and disclosure flows can
//! be exercised without a network.

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResult};
use tokio::sync::Mutex;

/// Scripted behavior for one completion call.
#[derive(Clone, Debug)]
pub enum ScriptedReply {
    /// Return this text as the final turn.
    Text(String),
    /// Fail the call with a request error.
    Error(String),
}

/// A sequence of replies; each call to `complete` pops the next one.
/// When the sequence is exhausted, the default reply is returned.
pub struct ScriptedProvider {
    replies: Mutex<Vec<ScriptedReply>>,
    default_reply: ScriptedReply,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedProvider {
    /// A provider that always returns the same text.
    pub fn constant(text: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            default_reply: ScriptedReply::Text(text.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider with a sequence of replies, consumed in order.
    pub fn sequence(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            default_reply: ScriptedReply::Text("(scripted: sequence exhausted)".into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that always fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            default_reply: ScriptedReply::Error(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of completion calls made so far.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// The requests seen so far, in call order.
    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: LlmRequest) -> LlmResult<String> {
        self.requests.lock().await.push(request);

        let mut replies = self.replies.lock().await;
        let reply = if replies.is_empty() {
            self.default_reply.clone()
        } else {
            replies.remove(0)
        };

        match reply {
            ScriptedReply::Text(text) => Ok(text),
            ScriptedReply::Error(message) => Err(LlmError::RequestFailed(message)),
        }
    }
}
