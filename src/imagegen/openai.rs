use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

use super::{map_image_status, GeneratedImage, ImageAdapter, ImageProvider};

const IMAGE_MODEL: &str = "dall-e-3";
const IMAGE_SIZE: &str = "1024x1024";

// OpenAI image API structures

#[derive(Serialize, Deserialize, Debug)]
pub struct OpenAIImageRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
    pub response_format: String,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIImageResponse {
    #[serde(default)]
    pub data: Vec<OpenAIImageData>,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIImageData {
    pub b64_json: String,
}

/// OpenAI image adapter
pub struct OpenAIImageAdapter {
    base_url: String,
    client: Client,
}

impl OpenAIImageAdapter {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait]
impl ImageAdapter for OpenAIImageAdapter {
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<GeneratedImage, AppError> {
        let request = OpenAIImageRequest {
            model: IMAGE_MODEL.to_string(),
            prompt: prompt.to_string(),
            n: 1,
            size: IMAGE_SIZE.to_string(),
            response_format: "b64_json".to_string(),
        };

        let url = format!(
            "{}/images/generations",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::provider_error(
                    500,
                    format!("Failed to send request to OpenAI images: {e}"),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_image_status(ImageProvider::OpenAi, status, &error_body));
        }

        let image_res = response.json::<OpenAIImageResponse>().await.map_err(|e| {
            AppError::provider_error(500, format!("Failed to parse OpenAI image response: {e}"))
        })?;

        let Some(image) = image_res.data.into_iter().next() else {
            return Err(AppError::NoImageProduced("OpenAI".to_string()));
        };

        // The image endpoint returns bare base64 with no mime hint; PNG is
        // what the API emits for b64_json.
        Ok(GeneratedImage {
            data: image.b64_json,
            mime_type: "image/png".to_string(),
        })
    }
}
