// Anthropic Provider Implementation
use async_trait::async_trait;
use reqwest::Client;

use crate::{
    catalog::Model,
    errors::AppError,
    providers::{error_envelope_message, ChatAdapter, CompletionRequest, CompletionResponse},
};

use super::model::{AnthropicRequest, AnthropicResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic adapter
pub struct AnthropicAdapter {
    base_url: String,
    client: Client,
}

impl AnthropicAdapter {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait]
impl ChatAdapter for AnthropicAdapter {
    async fn complete(
        &self,
        model: &Model,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, AppError> {
        let anthropic_req = AnthropicRequest::from_canonical(request, model.output_limit);

        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &request.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&anthropic_req)
            .send()
            .await
            .map_err(|e| {
                AppError::provider_error(500, format!("Failed to send request to Anthropic: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            let message = error_envelope_message(&error_body)
                .unwrap_or_else(|| format!("Anthropic API error: {error_body}"));
            return Err(AppError::provider_error(status, message));
        }

        let anthropic_res = response.json::<AnthropicResponse>().await.map_err(|e| {
            AppError::provider_error(500, format!("Failed to parse Anthropic response: {e}"))
        })?;

        anthropic_res.into_canonical()
    }
}
