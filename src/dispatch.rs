use std::sync::Arc;

use reqwest::Client;

use crate::{
    catalog::{ModelCatalog, Provider},
    config::EndpointConfig,
    errors::AppError,
    providers::{
        AnthropicAdapter, ChatAdapter, CompletionRequest, CompletionResponse, GeminiAdapter,
        OpenAIAdapter,
    },
};

/// Routes canonical completion requests to the adapter for their provider.
///
/// The provider set is closed: adding a [`Provider`] variant forces the
/// match in [`dispatch`](Self::dispatch) to be extended, so a catalog entry
/// can never name a provider without an adapter.
pub struct LlmDispatcher {
    catalog: Arc<ModelCatalog>,
    gemini: GeminiAdapter,
    anthropic: AnthropicAdapter,
    openai: OpenAIAdapter,
}

impl LlmDispatcher {
    pub fn new(catalog: Arc<ModelCatalog>, endpoints: &EndpointConfig, client: Client) -> Self {
        Self {
            gemini: GeminiAdapter::new(endpoints.gemini.clone(), client.clone()),
            anthropic: AnthropicAdapter::new(endpoints.anthropic.clone(), client.clone()),
            openai: OpenAIAdapter::new(endpoints.openai.clone(), client),
            catalog,
        }
    }

    /// Validate, resolve the model and delegate to the matching adapter.
    ///
    /// An unknown model id fails here, before any network traffic.
    pub async fn dispatch(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AppError> {
        request.validate().map_err(AppError::BadRequest)?;

        let model = self.catalog.lookup(&request.model)?;

        tracing::debug!(
            provider = %request.provider,
            model = %request.model,
            messages = request.messages.len(),
            "dispatching completion"
        );

        match request.provider {
            Provider::Gemini => self.gemini.complete(model, &request).await,
            Provider::Anthropic => self.anthropic.complete(model, &request).await,
            Provider::OpenAi => self.openai.complete(model, &request).await,
        }
    }
}
