use async_trait::async_trait;
use reqwest::Client;

use crate::{
    catalog::Model,
    errors::AppError,
    providers::{error_envelope_message, ChatAdapter, CompletionRequest, CompletionResponse},
};

use super::model::{OpenAIRequest, OpenAIResponse};

/// OpenAI adapter
pub struct OpenAIAdapter {
    base_url: String,
    client: Client,
}

impl OpenAIAdapter {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait]
impl ChatAdapter for OpenAIAdapter {
    async fn complete(
        &self,
        model: &Model,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, AppError> {
        let openai_req = OpenAIRequest::from_canonical(request, model.output_limit);

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", request.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_req)
            .send()
            .await
            .map_err(|e| {
                AppError::provider_error(500, format!("Failed to send request to OpenAI: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            let message = error_envelope_message(&error_body)
                .unwrap_or_else(|| format!("OpenAI API error: {error_body}"));
            return Err(AppError::provider_error(status, message));
        }

        let openai_res = response.json::<OpenAIResponse>().await.map_err(|e| {
            AppError::provider_error(500, format!("Failed to parse OpenAI response: {e}"))
        })?;

        openai_res.into_canonical()
    }
}
