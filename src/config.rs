use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::catalog::{ANTHROPIC_ENDPOINT, GEMINI_ENDPOINT, OPENAI_ENDPOINT};

/// Service configuration, loaded from `config.toml` plus `BREWLOG_AI_`
/// environment variables (nested keys split on `__`, so
/// `BREWLOG_AI_AI__FALLBACK_API_KEY` overrides `ai.fallback_api_key`).
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Provider-independent AI settings owned by the server, not by users.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AiConfig {
    /// Server-held Gemini key that runs the default model for requests
    /// carrying no usable key of their own. Optional: without it such
    /// requests fail with a configuration error.
    #[serde(default)]
    pub fallback_api_key: Option<String>,
    /// Outbound HTTP timeout for provider calls.
    #[serde(default = "default_ai_timeout")]
    pub timeout_seconds: u64,
}

/// Provider API base URLs. Overridden in tests to point at mock servers.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EndpointConfig {
    #[serde(default = "default_gemini_endpoint")]
    pub gemini: String,
    #[serde(default = "default_anthropic_endpoint")]
    pub anthropic: String,
    #[serde(default = "default_openai_endpoint")]
    pub openai: String,
    #[serde(default = "default_google_images_endpoint")]
    pub google_images: String,
    #[serde(default = "default_openai_images_endpoint")]
    pub openai_images: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_ai_timeout() -> u64 {
    60
}
fn default_gemini_endpoint() -> String {
    GEMINI_ENDPOINT.to_string()
}
fn default_anthropic_endpoint() -> String {
    ANTHROPIC_ENDPOINT.to_string()
}
fn default_openai_endpoint() -> String {
    OPENAI_ENDPOINT.to_string()
}
fn default_google_images_endpoint() -> String {
    // Imagen lives under the same API surface as Gemini.
    GEMINI_ENDPOINT.to_string()
}
fn default_openai_images_endpoint() -> String {
    OPENAI_ENDPOINT.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            fallback_api_key: None,
            timeout_seconds: default_ai_timeout(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            gemini: default_gemini_endpoint(),
            anthropic: default_anthropic_endpoint(),
            openai: default_openai_endpoint(),
            google_images: default_google_images_endpoint(),
            openai_images: default_openai_images_endpoint(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Load and validate the configuration.
///
/// `config.toml` is optional; every section has working defaults, so a
/// bare environment with just the fallback key env var is a valid setup.
pub fn load_config(config_path: &str) -> Result<Config> {
    let config: Config = Figment::new()
        .merge(Toml::file(config_path))
        .merge(Env::prefixed("BREWLOG_AI_").split("__"))
        .extract()
        .context("Failed to load configuration from config file or environment variables")?;

    config.validate().context("Configuration validation failed")?;

    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.server
            .validate()
            .context("Server configuration validation failed")?;
        self.ai
            .validate()
            .context("AI configuration validation failed")?;
        self.endpoints
            .validate()
            .context("Endpoint configuration validation failed")?;
        self.logging
            .validate()
            .context("Logging configuration validation failed")?;
        Ok(())
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }
        if self.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }
        Ok(())
    }
}

impl AiConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(key) = &self.fallback_api_key {
            if key.is_empty() {
                return Err(anyhow::anyhow!(
                    "Fallback API key cannot be empty when set; omit it instead"
                ));
            }
            if key.len() < 10 {
                return Err(anyhow::anyhow!(
                    "Fallback API key seems too short (minimum 10 characters)"
                ));
            }
        }

        if self.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("AI timeout must be greater than 0"));
        }
        if self.timeout_seconds > 600 {
            return Err(anyhow::anyhow!("AI timeout cannot exceed 600 seconds"));
        }

        Ok(())
    }
}

impl EndpointConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("gemini", &self.gemini),
            ("anthropic", &self.anthropic),
            ("openai", &self.openai),
            ("google_images", &self.google_images),
            ("openai_images", &self.openai_images),
        ] {
            if url.is_empty() {
                return Err(anyhow::anyhow!("Endpoint '{}' cannot be empty", name));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "Endpoint '{}' must start with http:// or https://",
                    name
                ));
            }
        }
        Ok(())
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}': must be one of {:?}",
                self.level,
                valid_levels
            ));
        }

        let valid_formats = ["json", "pretty", "compact"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}': must be one of {:?}",
                self.format,
                valid_formats
            ));
        }

        Ok(())
    }
}
