//! AI platform client layer.
//!
//! Every upstream model is reached through the [`AiPlatform`] trait so the
//! handlers and the extraction pipeline can run against [`MockPlatform`] in
//! tests and against real OpenAI-compatible providers in production.

mod mock;
mod openai;
mod router;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use mock::MockPlatform;
pub use openai::OpenAiCompatProvider;
pub use router::{Provider, ProviderRouter, resolve_model};

#[derive(Error, Debug)]
pub enum LlmError {
    // transport level: connect, timeout, body read
    #[error("request to AI platform failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI platform returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response from AI platform: {0}")]
    InvalidResponse(String),

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("provider {0} is not configured (missing API key)")]
    ProviderNotConfigured(Provider),

    #[error("AI platform error: {0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Constrains the completion to a JSON document matching `schema`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: Option<JsonSchemaFormat>,
}

impl CompletionRequest {
    // system prompt (skipped when empty) followed by one user turn
    pub fn new(model: impl Into<String>, system: &str, user: impl Into<String>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(user));
        Self {
            model: model.into(),
            messages,
            response_format: None,
        }
    }

    pub fn with_json_schema(mut self, format: JsonSchemaFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    // Content of the last user turn
    pub fn user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
    }
}

#[async_trait]
pub trait AiPlatform: Send + Sync {
    /// Run one completion and return the assistant text, trimmed.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}
