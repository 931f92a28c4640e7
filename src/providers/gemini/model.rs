use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::providers::{
    ChatMessage, CompletionRequest, CompletionResponse, ContentPart, MessageContent, Role,
    TokenUsage,
};

// Gemini-specific data structures for API communication

#[derive(Serialize, Deserialize, Debug)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(
        rename = "systemInstruction",
        skip_serializing_if = "Option::is_none"
    )]
    pub system_instruction: Option<GeminiSystemInstruction>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GeminiSystemInstruction {
    pub parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GeminiContent {
    pub role: String,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A Gemini part is either `{"text"}` or `{"inlineData"}`, nothing tags it.
#[derive(Serialize, Deserialize, Debug)]
#[serde(untagged)]
pub enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
}

#[derive(Deserialize, Debug)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug)]
pub struct GeminiCandidate {
    pub content: GeminiContent,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    pub prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    pub candidates_token_count: Option<u32>,
    #[serde(rename = "totalTokenCount")]
    pub total_token_count: Option<u32>,
}

impl GeminiRequest {
    /// Build the native request from a canonical one.
    ///
    /// Roles map user -> "user" and assistant -> "model"; the system prompt
    /// becomes a top-level `systemInstruction`. Image parts are re-wrapped
    /// as `inlineData` with the base64 payload untouched.
    pub fn from_canonical(request: &CompletionRequest, output_limit: u32) -> Self {
        let contents = request.messages.iter().map(content_from_message).collect();

        let system_instruction = request.system.as_ref().map(|text| GeminiSystemInstruction {
            parts: vec![GeminiPart::Text { text: text.clone() }],
        });

        Self {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                max_output_tokens: output_limit,
            },
        }
    }
}

fn content_from_message(message: &ChatMessage) -> GeminiContent {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "model",
    };

    let parts = match &message.content {
        MessageContent::Text(text) => vec![GeminiPart::Text { text: text.clone() }],
        MessageContent::Parts(parts) => parts
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => GeminiPart::Text { text: text.clone() },
                ContentPart::Image { data, mime_type } => GeminiPart::InlineData {
                    inline_data: GeminiInlineData {
                        mime_type: mime_type.clone(),
                        data: data.clone(),
                    },
                },
            })
            .collect(),
    };

    GeminiContent {
        role: role.to_string(),
        parts,
    }
}

impl GeminiResponse {
    /// Collapse the first candidate into canonical text + usage.
    pub fn into_canonical(self, model: &str) -> Result<CompletionResponse, AppError> {
        let text = self
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        GeminiPart::Text { text } => Some(text.as_str()),
                        GeminiPart::InlineData { .. } => None,
                    })
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        // A 200 with no candidates (or text-less parts) is a protocol-level
        // empty answer, not a transport failure.
        if text.is_empty() {
            return Err(AppError::EmptyResponse("Gemini".to_string()));
        }

        let usage = self.usage_metadata.and_then(|meta| {
            match (meta.prompt_token_count, meta.candidates_token_count) {
                (Some(input_tokens), Some(output_tokens)) => Some(TokenUsage {
                    input_tokens,
                    output_tokens,
                }),
                _ => None,
            }
        });

        Ok(CompletionResponse {
            text,
            model: model.to_string(),
            usage,
        })
    }
}
