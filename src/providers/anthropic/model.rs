use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::providers::{
    ChatMessage, CompletionRequest, CompletionResponse, ContentPart, MessageContent, Role,
    TokenUsage,
};

// Anthropic-specific data structures for API communication

#[derive(Serialize, Deserialize, Debug)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<AnthropicMessage>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: Vec<AnthropicContentBlock>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    Text { text: String },
    Image { source: AnthropicImageSource },
}

/// Base64 image source block. `media_type` is Anthropic's name for the mime
/// type; the payload is forwarded without re-encoding.
#[derive(Serialize, Deserialize, Debug)]
pub struct AnthropicImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AnthropicResponse {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub content: Vec<AnthropicResponseBlock>,
    pub usage: Option<AnthropicUsage>,
}

/// Response content block. Only `text` blocks carry answer text; tool-use
/// and thinking blocks deserialize with `text: None` and are skipped.
#[derive(Serialize, Deserialize, Debug)]
pub struct AnthropicResponseBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AnthropicUsage {
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

impl AnthropicRequest {
    /// Build the native request from a canonical one.
    ///
    /// The system prompt rides in the top-level `system` field; messages
    /// keep their order with content expanded to block lists.
    pub fn from_canonical(request: &CompletionRequest, output_limit: u32) -> Self {
        let messages = request.messages.iter().map(message_to_blocks).collect();

        Self {
            model: request.model.clone(),
            max_tokens: output_limit,
            system: request.system.clone(),
            messages,
        }
    }
}

fn message_to_blocks(message: &ChatMessage) -> AnthropicMessage {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    let content = match &message.content {
        MessageContent::Text(text) => vec![AnthropicContentBlock::Text { text: text.clone() }],
        MessageContent::Parts(parts) => parts
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => {
                    AnthropicContentBlock::Text { text: text.clone() }
                }
                ContentPart::Image { data, mime_type } => AnthropicContentBlock::Image {
                    source: AnthropicImageSource {
                        source_type: "base64".to_string(),
                        media_type: mime_type.clone(),
                        data: data.clone(),
                    },
                },
            })
            .collect(),
    };

    AnthropicMessage {
        role: role.to_string(),
        content,
    }
}

impl AnthropicResponse {
    /// Concatenate the text blocks into canonical text + usage.
    pub fn into_canonical(self) -> Result<CompletionResponse, AppError> {
        let text = self
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(AppError::EmptyResponse("Anthropic".to_string()));
        }

        let usage = self.usage.and_then(|usage| {
            match (usage.input_tokens, usage.output_tokens) {
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
