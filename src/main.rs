//! Tallysheet: time-tracking entries to spreadsheet rows.
//!
//! This is the application entry point. It loads configuration from a TOML
//! file, initializes tracing, builds the configured sheet, sets up the Axum
//! router and starts the HTTP server.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tallysheet::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use tallysheet::http::start_server;
use tallysheet::sheet::SheetHandle;
use tallysheet::{create_router, AppState};

/// Tallysheet: append time-tracking entries to a spreadsheet
#[derive(Parser, Debug)]
#[command(name = "tallysheet", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "tallysheet=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config first: it decides the log format
    let config = AppConfig::load(&args.config)?;

    // Log filter priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry = tracing_subscriber::registry().with(EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(path = %args.config, "Loaded configuration");

    let sheet = SheetHandle::from_config(&config.sheet)?;
    tracing::info!(sheet = %sheet.describe(), "Sheet configured");

    let state = AppState::new(config.clone(), sheet);
    let app = create_router(state);

    start_server(app, &config).await?;

    tracing::info!("Server stopped");
    Ok(())
}
