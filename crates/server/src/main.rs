use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slipway_core::{
    load_config, validate_config, DeployOrchestrator, FsStatusStore, GitSync, ProcessRunner,
    ReleaseBuilder, ReleaseManager,
};

use slipway_server::api::create_router;
use slipway_server::state::AppState;

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

    // Determine config path
    let config_path = std::env::var("SLIPWAY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully (version {})", VERSION);
    info!("Artifact root: {:?}", config.paths.root);
    info!("Source remote: {}", config.source.remote_url);

    // Log a config hash so operators can tell configs apart without secrets
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Config hash: {}", &config_hash[..16]);

    // Bootstrap the artifact layout once at startup
    let workdir = config.workdir();
    tokio::fs::create_dir_all(&config.paths.releases_dir())
        .await
        .with_context(|| format!("Failed to create {:?}", config.paths.releases_dir()))?;
    tokio::fs::create_dir_all(&workdir)
        .await
        .with_context(|| format!("Failed to create {:?}", workdir))?;

    // Wire the deploy pipeline
    let runner = Arc::new(ProcessRunner::new(Duration::from_secs(
        config.build.timeout_secs,
    )));
    let source = Arc::new(GitSync::new(
        config.source.remote_url.clone(),
        workdir.clone(),
        runner.clone(),
    ));

    let mut build_config = config.build.clone();
    build_config.cache_dir = Some(config.cache_dir());
    let builder = Arc::new(ReleaseBuilder::new(
        build_config,
        workdir,
        config.paths.releases_dir(),
        runner,
    ));

    let releases = Arc::new(ReleaseManager::new(
        config.paths.releases_dir(),
        config.paths.current_link(),
        config.releases.keep,
    ));
    let status = Arc::new(FsStatusStore::new(config.paths.status_file()));

    let orchestrator = DeployOrchestrator::new(
        config.source.default_ref.clone(),
        source,
        builder,
        releases,
        status,
    );
    info!("Deploy orchestrator initialized");

    if config.auth.token.as_deref().is_some_and(|t| !t.is_empty()) {
        info!("Auth token configured for mutating endpoints");
    } else {
        info!("No auth token configured; mutating endpoints are open");
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), orchestrator.clone()));

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

    // Let an in-flight deploy finish so the status record is not left stale
    info!("Server shutting down, waiting for in-flight deploy...");
    orchestrator.wait_idle().await;
    info!("Shutdown complete");

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
