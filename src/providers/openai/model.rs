use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::providers::{
    ChatMessage, CompletionRequest, CompletionResponse, ContentPart, MessageContent, Role,
    TokenUsage,
};

// OpenAI-specific data structures for API communication

#[derive(Serialize, Deserialize, Debug)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    pub max_tokens: u32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: OpenAIContent,
}

/// Chat content is a bare string for plain text and a part array as soon
/// as an image is involved.
#[derive(Serialize, Deserialize, Debug)]
#[serde(untagged)]
pub enum OpenAIContent {
    Text(String),
    Parts(Vec<OpenAIContentPart>),
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAIContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAIImageUrl },
}

#[derive(Serialize, Deserialize, Debug)]
pub struct OpenAIImageUrl {
    /// `data:{mime};base64,{payload}` data URL.
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIResponse {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
    pub usage: Option<OpenAIUsage>,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIResponseMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl OpenAIRequest {
    /// Build the native request from a canonical one.
    ///
    /// OpenAI has no dedicated system field; the system prompt becomes a
    /// leading message with role "system".
    pub fn from_canonical(request: &CompletionRequest, output_limit: u32) -> Self {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = &request.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: OpenAIContent::Text(system.clone()),
            });
        }

        messages.extend(request.messages.iter().map(message_to_openai));

        Self {
            model: request.model.clone(),
            messages,
            max_tokens: output_limit,
        }
    }
}

fn message_to_openai(message: &ChatMessage) -> OpenAIMessage {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    let content = match &message.content {
        MessageContent::Text(text) => OpenAIContent::Text(text.clone()),
        MessageContent::Parts(parts) => OpenAIContent::Parts(
            parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => OpenAIContentPart::Text { text: text.clone() },
                    ContentPart::Image { data, mime_type } => OpenAIContentPart::ImageUrl {
                        image_url: OpenAIImageUrl {
                            url: format!("data:{mime_type};base64,{data}"),
                            detail: None,
                        },
                    },
                })
                .collect(),
        ),
    };

    OpenAIMessage {
        role: role.to_string(),
        content,
    }
}

impl OpenAIResponse {
    /// Take the first choice's message text as canonical text + usage.
    pub fn into_canonical(self) -> Result<CompletionResponse, AppError> {
        let text = self
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::EmptyResponse("OpenAI".to_string()));
        }

        let usage = self.usage.and_then(|usage| {
            match (usage.prompt_tokens, usage.completion_tokens) {
                (Some(input_tokens), Some(output_tokens)) => Some(TokenUsage {
                    input_tokens,
                    output_tokens,
                }),
                _ => None,
            }
        });

        Ok(CompletionResponse {
            text,
            model: self.model,
            usage,
        })
    }
}
