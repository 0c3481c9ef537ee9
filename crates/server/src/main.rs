mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reformer_core::service::ConversionService;
use reformer_core::{
    load_config, validate_config, AudioSupport, Config, EngineSet, JobRegistry, RetentionSweeper,
    WorkspaceManager,
};

use api::create_router;
use state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("reformer {} starting", VERSION);

    // Load configuration: an explicitly named file must exist; the
    // default location may be absent, in which case defaults apply.
    let config = match std::env::var("REFORMER_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            info!("Loading configuration from {:?}", path);
            load_config(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
        Err(_) => {
            let path = PathBuf::from("config.toml");
            if path.exists() {
                info!("Loading configuration from {:?}", path);
                load_config(&path)
                    .with_context(|| format!("Failed to load config from {:?}", path))?
            } else {
                info!("No configuration file; using defaults");
                Config::default()
            }
        }
    };

    validate_config(&config).context("Configuration validation failed")?;
    info!("Workspace root: {:?}", config.storage.root);
    info!(
        "Retention: ttl {}s, sweep every {}s",
        config.storage.ttl_secs, config.storage.sweep_interval_secs
    );

    // Workspace manager
    let workspaces = WorkspaceManager::new(config.storage.root.clone());
    workspaces
        .ensure_root()
        .await
        .context("Failed to create workspace root")?;

    // Resolve engines once; operations fail fast on the missing ones.
    let engines = Arc::new(EngineSet::resolve(&config.engines).await);

    // Probe transcode capabilities once.
    let capabilities = AudioSupport::detect(&engines).await;
    info!(?capabilities, "Audio capabilities probed");

    // Conversion service and job registry
    let registry = JobRegistry::new(workspaces.clone());
    let service = ConversionService::new(
        &config,
        Arc::clone(&engines),
        capabilities,
        workspaces.clone(),
    );

    // Retention sweeper on its own timer task
    let sweeper = RetentionSweeper::new(
        config.storage.root.clone(),
        Duration::from_secs(config.storage.ttl_secs),
        Duration::from_secs(config.storage.sweep_interval_secs),
    );
    let sweeper_handle = sweeper.start();

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        workspaces,
        service,
        registry,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    sweeper.stop();
    let _ = sweeper_handle.await;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
