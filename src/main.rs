use brewlog_ai::{load_config, start_server, LoggingConfig};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "brewlog-ai", version, about = "AI orchestration service for the brewing log")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_tracing(&config.logging)?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        fallback_key_configured = config.ai.fallback_api_key.is_some(),
        "Configuration loaded successfully"
    );

    start_server(config).await?;

    Ok(())
}

/// Initialize structured logging.
///
/// `RUST_LOG` takes precedence when set; otherwise the configured level
/// applies to this crate with quieter defaults for dependencies.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("brewlog_ai={},tower_http=debug", logging.level))
    });

    let fmt_layer = match logging.format.as_str() {
        "json" => fmt::layer().with_target(true).json().boxed(),
        "pretty" => fmt::layer().with_target(true).pretty().boxed(),
        _ => fmt::layer().with_target(false).compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
