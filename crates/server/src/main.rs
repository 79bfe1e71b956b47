//! Fonoteca server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use fonoteca_core::config::AppConfig;
use fonoteca_server::{AppState, ProcessingQueue, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fonoteca - audio-sharing platform API server
#[derive(Parser, Debug)]
#[command(name = "fonotecad")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "FONOTECA_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Fonoteca v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override
    // everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    if config_path.exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("FONOTECA_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Register Prometheus metrics
    fonoteca_server::metrics::register_metrics();

    // Ensure the upload pipeline's filesystem roots exist before
    // accepting requests.
    tokio::fs::create_dir_all(&config.ingest.uploads_root)
        .await
        .with_context(|| {
            format!(
                "failed to create uploads root {}",
                config.ingest.uploads_root.display()
            )
        })?;
    tokio::fs::create_dir_all(&config.ingest.sounds_root)
        .await
        .with_context(|| {
            format!(
                "failed to create sounds root {}",
                config.ingest.sounds_root.display()
            )
        })?;

    // Initialize metadata store
    let metadata = fonoteca_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    tracing::info!("Metadata store initialized");

    // Spawn the background processing worker
    let processor = ProcessingQueue::spawn(metadata.clone());
    tracing::info!("Processing worker spawned");

    // Create application state and router
    let state = AppState::new(config.clone(), metadata, processor);
    let app = create_router(state);

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
