use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Chat-capable providers. Closed set: every variant has a native adapter,
/// so a catalog entry can never point at a provider we cannot dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    Anthropic,
    OpenAi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
        }
    }

    /// Human-readable name for user-facing error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Google Gemini",
            Provider::Anthropic => "Anthropic",
            Provider::OpenAi => "OpenAI",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(Provider::Gemini),
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAi),
            other => Err(AppError::bad_request(format!(
                "Unknown provider: {other}"
            ))),
        }
    }
}

/// Cost per million tokens, in USD. Informational only.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPricing {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

/// One entry in the static model catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: &'static str,
    pub provider: Provider,
    pub display_name: &'static str,
    pub context_window: u32,
    /// Maximum output tokens, forwarded to the provider as the generation cap.
    pub output_limit: u32,
    pub supports_vision: bool,
    /// Public API base for this model's provider. Dispatch may override it
    /// (local testing), the catalog records the canonical address.
    pub endpoint: &'static str,
    pub pricing: ModelPricing,
    pub knowledge_cutoff: &'static str,
}

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1";
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// Static registry of every model the service can talk to.
///
/// Built once at startup from a checked-in table; adding a model is a code
/// change. Lookup is by exact model id.
pub struct ModelCatalog {
    models: Vec<Model>,
    index: HashMap<&'static str, usize>,
}

/// Model used when a request resolves to the server fallback key.
pub const DEFAULT_MODEL_ID: &str = "gemini-2.0-flash";

/// Default provider paired with [`DEFAULT_MODEL_ID`].
pub const DEFAULT_PROVIDER: Provider = Provider::Gemini;

impl ModelCatalog {
    pub fn new() -> Self {
        let models = builtin_models();
        let mut index = HashMap::with_capacity(models.len());
        for (pos, model) in models.iter().enumerate() {
            let previous = index.insert(model.id, pos);
            debug_assert!(previous.is_none(), "duplicate model id {}", model.id);
        }
        debug_assert!(index.contains_key(DEFAULT_MODEL_ID));
        Self { models, index }
    }

    /// Exact-id lookup. Unknown ids fail before any network activity.
    pub fn lookup(&self, id: &str) -> Result<&Model, AppError> {
        self.get(id)
            .ok_or_else(|| AppError::model_not_found(id))
    }

    pub fn get(&self, id: &str) -> Option<&Model> {
        self.index.get(id).map(|pos| &self.models[*pos])
    }

    pub fn default_model(&self) -> &Model {
        // The debug_assert in new() guarantees presence.
        &self.models[self.index[DEFAULT_MODEL_ID]]
    }

    pub fn by_provider(&self, provider: Provider) -> Vec<&Model> {
        self.models
            .iter()
            .filter(|m| m.provider == provider)
            .collect()
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_models() -> Vec<Model> {
    vec![
        Model {
            id: "gemini-2.0-flash",
            provider: Provider::Gemini,
            display_name: "Gemini 2.0 Flash",
            context_window: 1_048_576,
            output_limit: 8_192,
            supports_vision: true,
            endpoint: GEMINI_ENDPOINT,
            pricing: ModelPricing {
                input_per_mtok: 0.10,
                output_per_mtok: 0.40,
            },
            knowledge_cutoff: "2024-08",
        },
        Model {
            id: "gemini-1.5-pro",
            provider: Provider::Gemini,
            display_name: "Gemini 1.5 Pro",
            context_window: 2_097_152,
            output_limit: 8_192,
            supports_vision: true,
            endpoint: GEMINI_ENDPOINT,
            pricing: ModelPricing {
                input_per_mtok: 1.25,
                output_per_mtok: 5.00,
            },
            knowledge_cutoff: "2024-05",
        },
        Model {
            id: "gemini-1.5-flash",
            provider: Provider::Gemini,
            display_name: "Gemini 1.5 Flash",
            context_window: 1_048_576,
            output_limit: 8_192,
            supports_vision: true,
            endpoint: GEMINI_ENDPOINT,
            pricing: ModelPricing {
                input_per_mtok: 0.075,
                output_per_mtok: 0.30,
            },
            knowledge_cutoff: "2024-05",
        },
        Model {
            id: "claude-sonnet-4-20250514",
            provider: Provider::Anthropic,
            display_name: "Claude Sonnet 4",
            context_window: 200_000,
            output_limit: 64_000,
            supports_vision: true,
            endpoint: ANTHROPIC_ENDPOINT,
            pricing: ModelPricing {
                input_per_mtok: 3.00,
                output_per_mtok: 15.00,
            },
            knowledge_cutoff: "2025-03",
        },
        Model {
            id: "claude-3-5-sonnet-20241022",
            provider: Provider::Anthropic,
            display_name: "Claude 3.5 Sonnet",
            context_window: 200_000,
            output_limit: 8_192,
            supports_vision: true,
            endpoint: ANTHROPIC_ENDPOINT,
            pricing: ModelPricing {
                input_per_mtok: 3.00,
                output_per_mtok: 15.00,
            },
            knowledge_cutoff: "2024-04",
        },
        // Text-only model, the vision gate rejects it for image analysis.
        Model {
            id: "claude-3-5-haiku-20241022",
            provider: Provider::Anthropic,
            display_name: "Claude 3.5 Haiku",
            context_window: 200_000,
            output_limit: 8_192,
            supports_vision: false,
            endpoint: ANTHROPIC_ENDPOINT,
            pricing: ModelPricing {
                input_per_mtok: 0.80,
                output_per_mtok: 4.00,
            },
            knowledge_cutoff: "2024-07",
        },
        Model {
            id: "gpt-4o",
            provider: Provider::OpenAi,
            display_name: "GPT-4o",
            context_window: 128_000,
            output_limit: 16_384,
            supports_vision: true,
            endpoint: OPENAI_ENDPOINT,
            pricing: ModelPricing {
                input_per_mtok: 2.50,
                output_per_mtok: 10.00,
            },
            knowledge_cutoff: "2023-10",
        },
        Model {
            id: "gpt-4o-mini",
            provider: Provider::OpenAi,
            display_name: "GPT-4o mini",
            context_window: 128_000,
            output_limit: 16_384,
            supports_vision: true,
            endpoint: OPENAI_ENDPOINT,
            pricing: ModelPricing {
                input_per_mtok: 0.15,
                output_per_mtok: 0.60,
            },
            knowledge_cutoff: "2023-10",
        },
        Model {
            id: "gpt-3.5-turbo",
            provider: Provider::OpenAi,
            display_name: "GPT-3.5 Turbo",
            context_window: 16_385,
            output_limit: 4_096,
            supports_vision: false,
            endpoint: OPENAI_ENDPOINT,
            pricing: ModelPricing {
                input_per_mtok: 0.50,
                output_per_mtok: 1.50,
            },
            knowledge_cutoff: "2021-09",
        },
    ]
}
