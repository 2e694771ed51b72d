// src/services/llm.rs
// Client side of the hosted language model.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{Message, Role};

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("rate limited by model provider")]
    RateLimited,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("model returned no reply")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => LlmError::Http { status: status.as_u16(), body: err.to_string() },
            None => LlmError::Transport(err.to_string()),
        }
    }
}

/// Anything that can answer a transcript with a single AI message.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<Message, LlmError>;
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::Human => "user",
        Role::Ai => "assistant",
    }
}

fn build_request<'a>(model: &'a str, messages: &'a [Message]) -> CompletionRequest<'a> {
    CompletionRequest {
        model,
        messages: messages
            .iter()
            .map(|m| WireMessage { role: wire_role(m.role()), content: m.content() })
            .collect(),
    }
}

fn extract_reply(resp: CompletionResponse) -> Result<Message, LlmError> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(Message::Ai)
        .ok_or(LlmError::EmptyResponse)
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn invoke(&self, messages: &[Message]) -> Result<Message, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&build_request(&self.model, messages))
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Http { status: status.as_u16(), body });
        }

        extract_reply(resp.json::<CompletionResponse>().await?)
    }
}
