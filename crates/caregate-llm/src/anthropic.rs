//! Anthropic Claude API provider (non-streaming Messages API)

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResult};
use caregate_core::Role;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: LlmRequest) -> LlmResult<String> {
        let body = AnthropicRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| AnthropicMessage {
                    role: match m.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            system: request.system.clone(),
        };

        debug!("Anthropic request: model={}", body.model);

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Anthropic error {}: {}", status, error_text);

            return Err(match status.as_u16() {
                401 => LlmError::AuthFailed(error_text),
                429 => LlmError::RateLimited {
                    retry_after_ms: 60000,
                },
                _ => LlmError::RequestFailed(format!("{}: {}", status, error_text)),
            });
        }

        let parsed: AnthropicResponse = response.json().await?;
        let text: String = parsed
            .content
            .iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text.as_str()),
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(LlmError::InvalidResponse(
                "response carried no text content".into(),
            ));
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use caregate_core::Message;

    #[test]
    fn request_body_shape() {
        let body = AnthropicRequest {
            model: "claude-haiku-4-5-20251001".into(),
            messages: vec![AnthropicMessage {
                role: "user",
                content: "hello".into(),
            }],
            max_tokens: 1024,
            system: Some("You are an ENT specialist.".into()),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""role":"user""#));
        assert!(json.contains(r#""system":"You are an ENT specialist.""#));
        assert!(json.contains(r#""max_tokens":1024"#));
    }

    #[test]
    fn request_body_skips_absent_system() {
        let body = AnthropicRequest {
            model: "m".into(),
            messages: vec![],
            max_tokens: 8,
            system: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("system"));
    }

    #[test]
    fn response_parse_concatenates_text_blocks() {
        let raw = r#"{"content":[{"type":"text","text":"Hello "},{"type":"text","text":"world"}]}"#;
        let parsed: AnthropicResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed
            .content
            .iter()
            .map(|ResponseBlock::Text { text }| text.as_str())
            .collect();
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn roles_map_to_wire_names() {
        let msgs = [Message::user("a"), Message::assistant("b")];
        let wire: Vec<&str> = msgs
            .iter()
            .map(|m| match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            })
            .collect();
        assert_eq!(wire, vec!["user", "assistant"]);
    }
}
