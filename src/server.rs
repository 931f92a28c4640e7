use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    catalog::ModelCatalog,
    config::Config,
    dispatch::LlmDispatcher,
    errors::{AppError, AppResult},
    imagegen::{GeneratedImage, ImageDispatcher},
    middleware::request_logging,
    resolver::ConfigResolver,
    settings::{AiSettings, MemorySettingsStore, SettingsStore, SettingsUpdate},
    tasks::{
        AnalyzeImageInput, AnalyzeImageResult, GenerateImageInput, ParseVoiceInput,
        ParseVoiceResult,
    },
};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<ModelCatalog>,
    pub llm: Arc<LlmDispatcher>,
    pub images: Arc<ImageDispatcher>,
    pub resolver: Arc<ConfigResolver>,
    pub settings: Arc<dyn SettingsStore>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        // One pooled client shared by every outbound provider call.
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.ai.timeout_seconds))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| AppError::config(format!("Failed to create HTTP client: {}", e)))?;

        let catalog = Arc::new(ModelCatalog::new());
        let llm = Arc::new(LlmDispatcher::new(
            catalog.clone(),
            &config.endpoints,
            http_client.clone(),
        ));
        let images = Arc::new(ImageDispatcher::new(&config.endpoints, http_client));
        let resolver = Arc::new(ConfigResolver::new(
            catalog.clone(),
            config.ai.fallback_api_key.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            catalog,
            llm,
            images,
            resolver,
            settings: Arc::new(MemorySettingsStore::new()),
        })
    }
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // AI task endpoints
        .route("/v1/analyze-image", post(analyze_image_handler))
        .route("/v1/parse-voice", post(parse_voice_handler))
        .route("/v1/generate-image", post(generate_image_handler))
        // Catalog and per-user settings
        .route("/v1/models", get(list_models_handler))
        .route(
            "/v1/settings/{user_id}",
            get(get_settings_handler).patch(update_settings_handler),
        )
        // Health check
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_logging))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Start the HTTP server and serve until shutdown.
pub async fn start_server(config: Config) -> AppResult<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let app_state = AppState::new(config)?;
    let app = create_app(app_state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::config(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Brewlog AI server starting on {}", addr);
    tracing::info!("Available endpoints:");
    tracing::info!("  POST  /v1/analyze-image - Identify a product photo");
    tracing::info!("  POST  /v1/parse-voice - Parse a spoken brewing note");
    tracing::info!("  POST  /v1/generate-image - Generate a product image");
    tracing::info!("  GET   /v1/models - List available models");
    tracing::info!("  GET   /v1/settings/{{user_id}} - Read per-user AI settings");
    tracing::info!("  PATCH /v1/settings/{{user_id}} - Update per-user AI settings");
    tracing::info!("  GET   /health - Health check");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateImageResponse {
    image_base64: String,
    mime_type: String,
}

impl From<GeneratedImage> for GenerateImageResponse {
    fn from(image: GeneratedImage) -> Self {
        Self {
            image_base64: image.data,
            mime_type: image.mime_type,
        }
    }
}

// Request handlers

async fn analyze_image_handler(
    State(state): State<AppState>,
    Json(input): Json<AnalyzeImageInput>,
) -> AppResult<Json<AnalyzeImageResult>> {
    let result =
        crate::tasks::analyze_image(&state.llm, &state.resolver, state.settings.as_ref(), input)
            .await?;
    Ok(Json(result))
}

async fn parse_voice_handler(
    State(state): State<AppState>,
    Json(input): Json<ParseVoiceInput>,
) -> AppResult<Json<ParseVoiceResult>> {
    let result =
        crate::tasks::parse_voice(&state.llm, &state.resolver, state.settings.as_ref(), input)
            .await?;
    Ok(Json(result))
}

async fn generate_image_handler(
    State(state): State<AppState>,
    Json(input): Json<GenerateImageInput>,
) -> AppResult<Json<GenerateImageResponse>> {
    let image = crate::tasks::generate_image(
        &state.images,
        &state.resolver,
        state.settings.as_ref(),
        input,
    )
    .await?;
    Ok(Json(image.into()))
}

async fn list_models_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let response = json!({
        "models": state.catalog.models(),
        "defaultModel": state.catalog.default_model().id,
    });
    Ok(Json(response))
}

async fn get_settings_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<AiSettings>> {
    let settings = state.settings.load(&user_id).await?;
    Ok(Json(settings))
}

async fn update_settings_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(update): Json<SettingsUpdate>,
) -> AppResult<Json<AiSettings>> {
    tracing::info!(user_id = %user_id, "Updating AI settings");
    let settings = state.settings.update(&user_id, update).await?;
    Ok(Json(settings))
}

async fn health_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let response = json!({
        "status": "healthy",
        "service": "brewlog-ai",
        "version": env!("CARGO_PKG_VERSION"),
        "models_available": state.catalog.models().len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(response))
}
