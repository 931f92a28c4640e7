pub mod anthropic;
pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{Model, Provider};
use crate::errors::AppError;

// Re-export adapters for easier access
pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAIAdapter;

/// Message author role in the canonical conversation model.
///
/// System text never appears as a message role; it travels in
/// [`CompletionRequest::system`] and each adapter attaches it through the
/// provider's own mechanism.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One piece of multimodal message content.
///
/// Image data stays base64 end to end; adapters re-wrap it in the
/// provider-native envelope without decoding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { data: String, mime_type: String },
}

/// Message content, either a plain string or an ordered multimodal part list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(text) => text.is_empty(),
            MessageContent::Parts(parts) => parts.is_empty(),
        }
    }
}

/// Message structure for chat conversations
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// User message carrying an image followed by instruction text.
    pub fn user_with_image(
        text: impl Into<String>,
        image_base64: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Image {
                    data: image_base64.into(),
                    mime_type: mime_type.into(),
                },
                ContentPart::Text { text: text.into() },
            ]),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.content.is_empty() {
            return Err("Message content cannot be empty".to_string());
        }
        if let MessageContent::Parts(parts) = &self.content {
            for part in parts {
                match part {
                    ContentPart::Text { text } => {
                        if text.is_empty() {
                            return Err("Text part cannot be empty".to_string());
                        }
                    }
                    ContentPart::Image { data, mime_type } => {
                        if data.is_empty() {
                            return Err("Image part carries no data".to_string());
                        }
                        if !mime_type.starts_with("image/") {
                            return Err(format!("Invalid image mime type: {mime_type}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Canonical completion request, the single shape all adapters accept.
///
/// The API key rides on the request because key selection is per call
/// (caller override, user settings or the server fallback).
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub provider: Provider,
    pub model: String,
    pub api_key: String,
    pub messages: Vec<ChatMessage>,
    pub system: Option<String>,
}

impl CompletionRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if self.api_key.is_empty() {
            return Err("API key cannot be empty".to_string());
        }
        if self.messages.is_empty() {
            return Err("Messages cannot be empty".to_string());
        }
        for message in &self.messages {
            message.validate()?;
        }
        if let Some(system) = &self.system {
            if system.is_empty() {
                return Err("System prompt cannot be empty when present".to_string());
            }
        }
        Ok(())
    }
}

/// Canonical completion response returned by every adapter.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub model: String,
    /// Best effort: present only when the provider reported usage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Common contract for provider adapters.
///
/// One invocation performs exactly one non-streaming HTTP call and
/// normalizes the provider's answer into [`CompletionResponse`]. A 200
/// with no usable text maps to [`AppError::EmptyResponse`], never to an
/// empty string.
#[async_trait]
pub trait ChatAdapter: Send + Sync {
    async fn complete(
        &self,
        model: &Model,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, AppError>;
}

/// Pull the human-readable message out of a provider error body.
///
/// Gemini, Anthropic and OpenAI all nest it as `{"error": {"message"}}`;
/// callers fall back to the raw body when the envelope does not parse.
pub(crate) fn error_envelope_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
