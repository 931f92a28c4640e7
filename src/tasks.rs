//! Task entry points: the three AI flows the brewing log exposes.
//!
//! Each function validates its input, resolves the effective provider
//! configuration, builds the prompt, performs exactly one dispatch and
//! shapes the result. No retries, no caching; every failure propagates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    dispatch::LlmDispatcher,
    errors::AppError,
    extract::extract_json,
    imagegen::{GeneratedImage, ImageDispatcher},
    prompts::{self, EquipmentInventory, ImagePromptOptions, ProductKind},
    providers::{ChatMessage, CompletionRequest},
    resolver::{CallerConfig, ConfigResolver},
    settings::{AiSettings, SettingsStore},
};

/// Applied when the caller sends an image without naming its type.
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageInput {
    pub image_base64: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub product_type: ProductKind,
    #[serde(default)]
    pub ai_config: Option<CallerConfig>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Identification result: product fields stay an open map, the shared
/// fields are lifted out of it.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageResult {
    pub detected: Map<String, Value>,
    pub barcode: Option<String>,
    pub confidence: f32,
    pub sources: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParseVoiceInput {
    pub transcript: String,
    #[serde(default)]
    pub user_equipment: EquipmentInventory,
    #[serde(default)]
    pub ai_config: Option<CallerConfig>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParseVoiceResult {
    /// Brew attributes exactly as the model reported them; callers treat
    /// missing keys as "not mentioned".
    #[serde(default)]
    pub parsed: Map<String, Value>,
    #[serde(default)]
    pub matched_equipment: MatchedEquipment,
    #[serde(default)]
    pub raw_notes: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MatchedEquipment {
    #[serde(default)]
    pub coffee: Option<EquipmentMatch>,
    #[serde(default)]
    pub grinder: Option<EquipmentMatch>,
    #[serde(default)]
    pub brewer: Option<EquipmentMatch>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EquipmentMatch {
    pub id: String,
    pub name: String,
    pub confidence: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageInput {
    pub product_name: String,
    pub product_type: ProductKind,
    pub user_id: String,
    #[serde(default)]
    pub options: ImagePromptOptions,
}

/// Identify a product photo and return structured product fields.
pub async fn analyze_image(
    llm: &LlmDispatcher,
    resolver: &ConfigResolver,
    store: &dyn SettingsStore,
    input: AnalyzeImageInput,
) -> Result<AnalyzeImageResult, AppError> {
    if input.image_base64.trim().is_empty() {
        return Err(AppError::bad_request("imageBase64 is required"));
    }

    let settings = if input.ai_config.is_none() {
        load_settings_for(store, input.user_id.as_deref()).await?
    } else {
        None
    };
    let config = resolver.resolve_completion(input.ai_config, settings.as_ref())?;
    // Vision gate runs before the adapter so unsupported models never
    // reach the network.
    resolver.ensure_vision(&config)?;

    tracing::info!(
        product = input.product_type.as_str(),
        model = %config.model,
        "analyzing product image"
    );

    let prompt = prompts::image_analysis_prompt(input.product_type);
    let mime_type = input
        .mime_type
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());

    let request = CompletionRequest {
        provider: config.provider,
        model: config.model,
        api_key: config.api_key,
        messages: vec![ChatMessage::user_with_image(
            prompt,
            input.image_base64,
            mime_type,
        )],
        system: None,
    };

    let response = llm.dispatch(request).await?;
    let raw: Map<String, Value> = extract_json(&response.text)?;
    Ok(split_analysis(raw))
}

/// Turn a brewing voice note into brew attributes and equipment matches.
pub async fn parse_voice(
    llm: &LlmDispatcher,
    resolver: &ConfigResolver,
    store: &dyn SettingsStore,
    input: ParseVoiceInput,
) -> Result<ParseVoiceResult, AppError> {
    if input.transcript.trim().is_empty() {
        return Err(AppError::bad_request("transcript is required"));
    }

    let settings = if input.ai_config.is_none() {
        load_settings_for(store, input.user_id.as_deref()).await?
    } else {
        None
    };
    let config = resolver.resolve_completion(input.ai_config, settings.as_ref())?;

    tracing::info!(
        model = %config.model,
        transcript_chars = input.transcript.len(),
        "parsing voice note"
    );

    let system = prompts::voice_parsing_prompt(&input.user_equipment);

    let request = CompletionRequest {
        provider: config.provider,
        model: config.model,
        api_key: config.api_key,
        messages: vec![ChatMessage::user(input.transcript)],
        system: Some(system),
    };

    let response = llm.dispatch(request).await?;
    extract_json(&response.text)
}

/// Generate a product illustration with the user's image settings.
pub async fn generate_image(
    images: &ImageDispatcher,
    resolver: &ConfigResolver,
    store: &dyn SettingsStore,
    input: GenerateImageInput,
) -> Result<GeneratedImage, AppError> {
    if input.product_name.trim().is_empty() {
        return Err(AppError::bad_request("productName is required"));
    }
    if input.user_id.trim().is_empty() {
        return Err(AppError::bad_request("userId is required"));
    }

    let settings = store.load(&input.user_id).await?;
    let config = resolver.resolve_image_settings(&settings)?;

    tracing::info!(
        product = input.product_type.as_str(),
        provider = %config.provider,
        "generating product image"
    );

    let prompt =
        prompts::image_generation_prompt(&input.product_name, input.product_type, &input.options);

    images
        .generate(config.provider, &prompt, &config.api_key)
        .await
}

async fn load_settings_for(
    store: &dyn SettingsStore,
    user_id: Option<&str>,
) -> Result<Option<AiSettings>, AppError> {
    match user_id {
        Some(id) if !id.trim().is_empty() => Ok(Some(store.load(id).await?)),
        _ => Ok(None),
    }
}

/// Lift the shared identification fields out of the model's flat object;
/// whatever remains is the product-specific detection map.
fn split_analysis(mut raw: Map<String, Value>) -> AnalyzeImageResult {
    let barcode = match raw.remove("barcode") {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        // Models occasionally read barcodes out as numbers.
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let confidence = raw
        .remove("confidence")
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0) as f32;

    let sources = match raw.remove("sources") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    // Some models answer with the product fields already nested under a
    // "detected" key; unwrap it instead of double-nesting.
    let detected = match raw.remove("detected") {
        Some(Value::Object(mut inner)) => {
            inner.extend(raw);
            inner
        }
        Some(other) => {
            raw.insert("detected".to_string(), other);
            raw
        }
        None => raw,
    };

    AnalyzeImageResult {
        detected,
        barcode,
        confidence,
        sources,
    }
}
