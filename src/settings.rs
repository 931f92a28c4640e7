use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    catalog::{Provider, DEFAULT_MODEL_ID, DEFAULT_PROVIDER},
    errors::AppError,
    imagegen::ImageProvider,
};

/// Per-user AI preferences, owned by the persistence layer.
///
/// Created lazily with defaults on first read; only ever changed through
/// merge updates, never whole-record overwrites.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub selected_provider: Provider,
    pub selected_model: String,
    /// One stored key per chat provider.
    #[serde(default)]
    pub api_keys: HashMap<Provider, String>,
    /// When true, image generation derives provider and key from the text
    /// settings instead of the explicit image fields below.
    pub image_use_text_settings: bool,
    pub image_provider: ImageProvider,
    #[serde(default)]
    pub image_api_keys: HashMap<ImageProvider, String>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            selected_provider: DEFAULT_PROVIDER,
            selected_model: DEFAULT_MODEL_ID.to_string(),
            api_keys: HashMap::new(),
            image_use_text_settings: true,
            image_provider: ImageProvider::Google,
            image_api_keys: HashMap::new(),
        }
    }
}

impl AiSettings {
    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        self.api_keys.get(&provider).map(String::as_str)
    }

    pub fn image_api_key(&self, provider: ImageProvider) -> Option<&str> {
        self.image_api_keys.get(&provider).map(String::as_str)
    }

    /// Apply a merge update. Only the field groups the update carries are
    /// written; key maps interpret a `null` value as removal.
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(provider) = update.selected_provider {
            self.selected_provider = provider;
        }
        if let Some(model) = update.selected_model {
            self.selected_model = model;
        }
        if let Some(keys) = update.api_keys {
            for (provider, key) in keys {
                match key {
                    Some(key) => {
                        self.api_keys.insert(provider, key);
                    }
                    None => {
                        self.api_keys.remove(&provider);
                    }
                }
            }
        }
        if let Some(use_text) = update.image_use_text_settings {
            self.image_use_text_settings = use_text;
        }
        if let Some(provider) = update.image_provider {
            self.image_provider = provider;
        }
        if let Some(keys) = update.image_api_keys {
            for (provider, key) in keys {
                match key {
                    Some(key) => {
                        self.image_api_keys.insert(provider, key);
                    }
                    None => {
                        self.image_api_keys.remove(&provider);
                    }
                }
            }
        }
    }
}

/// Partial settings write. Absent fields leave the stored value untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_provider: Option<Provider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_keys: Option<HashMap<Provider, Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_use_text_settings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_provider: Option<ImageProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_api_keys: Option<HashMap<ImageProvider, Option<String>>>,
}

/// Persistence seam for AI settings.
///
/// The production app backs this with its document store; this service
/// ships an in-memory implementation.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load settings for a user, creating defaults on first read.
    async fn load(&self, user_id: &str) -> Result<AiSettings, AppError>;

    /// Merge-update and return the stored record.
    async fn update(
        &self,
        user_id: &str,
        update: SettingsUpdate,
    ) -> Result<AiSettings, AppError>;
}

/// In-memory settings store keyed by user id.
#[derive(Default)]
pub struct MemorySettingsStore {
    records: RwLock<HashMap<String, AiSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self, user_id: &str) -> Result<AiSettings, AppError> {
        if let Some(settings) = self.records.read().await.get(user_id) {
            return Ok(settings.clone());
        }
        let mut records = self.records.write().await;
        Ok(records.entry(user_id.to_string()).or_default().clone())
    }

    async fn update(
        &self,
        user_id: &str,
        update: SettingsUpdate,
    ) -> Result<AiSettings, AppError> {
        // The write lock spans read-modify-write, so concurrent updates to
        // different field groups both land.
        let mut records = self.records.write().await;
        let settings = records.entry(user_id.to_string()).or_default();
        settings.apply(update);
        Ok(settings.clone())
    }
}
