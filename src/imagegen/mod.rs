pub mod google;
pub mod openai;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::EndpointConfig,
    errors::AppError,
    providers::error_envelope_message,
};

pub use google::GoogleImageAdapter;
pub use openai::OpenAIImageAdapter;

/// Image-capable providers. Closed set, mirrors [`crate::catalog::Provider`]
/// for the chat side.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageProvider {
    Google,
    OpenAi,
}

impl ImageProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageProvider::Google => "google",
            ImageProvider::OpenAi => "openai",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ImageProvider::Google => "Google",
            ImageProvider::OpenAi => "OpenAI",
        }
    }
}

impl fmt::Display for ImageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(ImageProvider::Google),
            "openai" => Ok(ImageProvider::OpenAi),
            other => Err(AppError::bad_request(format!(
                "Unknown image provider: {other}"
            ))),
        }
    }
}

/// One generated image, base64 exactly as the provider returned it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GeneratedImage {
    pub data: String,
    pub mime_type: String,
}

/// Common contract for image adapters: one prompt in, one image out.
#[async_trait]
pub trait ImageAdapter: Send + Sync {
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<GeneratedImage, AppError>;
}

/// Translate a non-success image API status into user-actionable language.
///
/// Both providers use the same status vocabulary here, so the mapping is
/// shared; anything unrecognized keeps the provider's own message.
pub(crate) fn map_image_status(provider: ImageProvider, status: u16, body: &str) -> AppError {
    let message = match status {
        400 => "Unable to generate this image. Try refining the description.".to_string(),
        429 => format!(
            "{} is rate limiting image generation. Try again shortly.",
            provider.display_name()
        ),
        401 => format!("Invalid {} API key.", provider.display_name()),
        _ => {
            let detail =
                error_envelope_message(body).unwrap_or_else(|| body.to_string());
            format!(
                "Image generation failed ({}): {detail}",
                provider.display_name()
            )
        }
    };
    AppError::provider_error(status, message)
}

/// Routes image generation to the adapter for the resolved provider.
pub struct ImageDispatcher {
    google: GoogleImageAdapter,
    openai: OpenAIImageAdapter,
}

impl ImageDispatcher {
    pub fn new(endpoints: &EndpointConfig, client: Client) -> Self {
        Self {
            google: GoogleImageAdapter::new(endpoints.google_images.clone(), client.clone()),
            openai: OpenAIImageAdapter::new(endpoints.openai_images.clone(), client),
        }
    }

    pub async fn generate(
        &self,
        provider: ImageProvider,
        prompt: &str,
        api_key: &str,
    ) -> Result<GeneratedImage, AppError> {
        tracing::debug!(provider = %provider, "dispatching image generation");

        match provider {
            ImageProvider::Google => self.google.generate(prompt, api_key).await,
            ImageProvider::OpenAi => self.openai.generate(prompt, api_key).await,
        }
    }
}
