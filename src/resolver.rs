use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{ModelCatalog, Provider, DEFAULT_MODEL_ID, DEFAULT_PROVIDER},
    errors::AppError,
    imagegen::ImageProvider,
    settings::AiSettings,
};

/// Caller-supplied completion override. All three parts travel together;
/// a partial override is not representable.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CallerConfig {
    pub provider: Provider,
    pub model_id: String,
    pub api_key: String,
}

/// Effective completion configuration after precedence is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub provider: Provider,
    pub model: String,
    pub api_key: String,
}

/// Effective image-generation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenConfig {
    pub provider: ImageProvider,
    pub api_key: String,
}

/// Resolves which provider, model and key a task runs with.
///
/// The server fallback key is injected at construction; nothing here reads
/// the environment at request time.
pub struct ConfigResolver {
    catalog: Arc<ModelCatalog>,
    fallback_api_key: Option<String>,
}

impl ConfigResolver {
    pub fn new(catalog: Arc<ModelCatalog>, fallback_api_key: Option<String>) -> Self {
        Self {
            catalog,
            fallback_api_key,
        }
    }

    /// Apply completion-config precedence.
    ///
    /// A caller override wins verbatim. Otherwise the user's stored
    /// selection applies when it carries a key for its provider. Otherwise
    /// the server fallback key runs the fixed default provider and model.
    /// Nothing usable is a hard configuration failure, never a retry.
    pub fn resolve_completion(
        &self,
        caller: Option<CallerConfig>,
        settings: Option<&AiSettings>,
    ) -> Result<CompletionConfig, AppError> {
        if let Some(caller) = caller {
            return Ok(CompletionConfig {
                provider: caller.provider,
                model: caller.model_id,
                api_key: caller.api_key,
            });
        }

        if let Some(settings) = settings {
            if let Some(key) = settings.api_key(settings.selected_provider) {
                return Ok(CompletionConfig {
                    provider: settings.selected_provider,
                    model: settings.selected_model.clone(),
                    api_key: key.to_string(),
                });
            }
        }

        let Some(key) = &self.fallback_api_key else {
            return Err(AppError::config(
                "No AI provider key configured on the server",
            ));
        };

        Ok(CompletionConfig {
            provider: DEFAULT_PROVIDER,
            model: DEFAULT_MODEL_ID.to_string(),
            api_key: key.clone(),
        })
    }

    /// Reject configurations whose model cannot read images.
    ///
    /// Runs on the effective configuration before any network call, so an
    /// unsupported model never costs the user a provider round trip.
    pub fn ensure_vision(&self, config: &CompletionConfig) -> Result<(), AppError> {
        let model = self.catalog.lookup(&config.model)?;
        if !model.supports_vision {
            return Err(AppError::VisionNotSupported(config.model.clone()));
        }
        Ok(())
    }

    /// Map user settings to the effective image provider and key.
    ///
    /// With `image_use_text_settings` set, an OpenAI text configuration
    /// draws with OpenAI and its text key. No other chat provider can
    /// draw, so everything else falls back to Google's image API with the
    /// user's Gemini key. Otherwise the explicit image provider and its
    /// dedicated key apply. A missing key names the provider the user has
    /// to configure.
    pub fn resolve_image_settings(
        &self,
        settings: &AiSettings,
    ) -> Result<ImageGenConfig, AppError> {
        let (provider, key) = if settings.image_use_text_settings {
            match settings.selected_provider {
                Provider::OpenAi => (ImageProvider::OpenAi, settings.api_key(Provider::OpenAi)),
                Provider::Gemini | Provider::Anthropic => {
                    (ImageProvider::Google, settings.api_key(Provider::Gemini))
                }
            }
        } else {
            let provider = settings.image_provider;
            (provider, settings.image_api_key(provider))
        };

        let key = key.ok_or_else(|| {
            AppError::MissingUserApiKey(provider.display_name().to_string())
        })?;

        Ok(ImageGenConfig {
            provider,
            api_key: key.to_string(),
        })
    }
}
