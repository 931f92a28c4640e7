use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

use super::{map_image_status, GeneratedImage, ImageAdapter, ImageProvider};

/// Imagen model used for product illustrations.
const IMAGE_MODEL: &str = "imagen-3.0-generate-002";

// Imagen predict API structures

#[derive(Serialize, Deserialize, Debug)]
pub struct GoogleImageRequest {
    pub instances: Vec<GoogleImageInstance>,
    pub parameters: GoogleImageParameters,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GoogleImageInstance {
    pub prompt: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GoogleImageParameters {
    #[serde(rename = "sampleCount")]
    pub sample_count: u32,
}

#[derive(Deserialize, Debug)]
pub struct GoogleImageResponse {
    #[serde(default)]
    pub predictions: Vec<GoogleImagePrediction>,
}

#[derive(Deserialize, Debug)]
pub struct GoogleImagePrediction {
    #[serde(rename = "bytesBase64Encoded")]
    pub bytes_base64_encoded: String,
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
}

/// Google Imagen adapter
pub struct GoogleImageAdapter {
    base_url: String,
    client: Client,
}

impl GoogleImageAdapter {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait]
impl ImageAdapter for GoogleImageAdapter {
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<GeneratedImage, AppError> {
        let request = GoogleImageRequest {
            instances: vec![GoogleImageInstance {
                prompt: prompt.to_string(),
            }],
            parameters: GoogleImageParameters { sample_count: 1 },
        };

        let url = format!(
            "{}/models/{}:predict?key={}",
            self.base_url.trim_end_matches('/'),
            IMAGE_MODEL,
            api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::provider_error(500, format!("Failed to send request to Imagen: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_image_status(ImageProvider::Google, status, &error_body));
        }

        let image_res = response.json::<GoogleImageResponse>().await.map_err(|e| {
            AppError::provider_error(500, format!("Failed to parse Imagen response: {e}"))
        })?;

        let Some(prediction) = image_res.predictions.into_iter().next() else {
            return Err(AppError::NoImageProduced("Google".to_string()));
        };

        Ok(GeneratedImage {
            data: prediction.bytes_base64_encoded,
            mime_type: prediction
                .mime_type
                .unwrap_or_else(|| "image/png".to_string()),
        })
    }
}
