use async_trait::async_trait;
use reqwest::Client;

use crate::{
    catalog::Model,
    errors::AppError,
    providers::{error_envelope_message, ChatAdapter, CompletionRequest, CompletionResponse},
};

use super::model::{GeminiRequest, GeminiResponse};

/// Google Gemini adapter
pub struct GeminiAdapter {
    base_url: String,
    client: Client,
}

impl GeminiAdapter {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait]
impl ChatAdapter for GeminiAdapter {
    async fn complete(
        &self,
        model: &Model,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, AppError> {
        let gemini_req = GeminiRequest::from_canonical(request, model.output_limit);

        // Gemini authenticates through the query string, not a header.
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            request.model,
            request.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&gemini_req)
            .send()
            .await
            .map_err(|e| {
                AppError::provider_error(500, format!("Failed to send request to Gemini: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            let message = error_envelope_message(&error_body)
                .unwrap_or_else(|| format!("Gemini API error: {error_body}"));
            return Err(AppError::provider_error(status, message));
        }

        let gemini_res = response.json::<GeminiResponse>().await.map_err(|e| {
            AppError::provider_error(500, format!("Failed to parse Gemini response: {e}"))
        })?;

        gemini_res.into_canonical(&request.model)
    }
}
