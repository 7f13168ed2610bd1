//! Narrator Server Entry Point

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use narrator_config::{load_settings, Settings};
use narrator_pipeline::FfmpegEncoder;
use narrator_server::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first (tracing init needs observability settings)
    let config = load_settings(std::env::var("NARRATOR_ENV").ok().as_deref())?;

    init_tracing(&config);

    tracing::info!("Starting narrator audio service v{}", env!("CARGO_PKG_VERSION"));

    // Temp namespace for segment and merged artifacts
    tokio::fs::create_dir_all(&config.merge.temp_dir).await?;
    tracing::info!(path = %config.merge.temp_dir.display(), "temp directory ready");

    if FfmpegEncoder::is_available().await {
        tracing::info!("ffmpeg found on PATH");
    } else {
        tracing::warn!("ffmpeg not found on PATH, merged track export will fail");
    }

    // Create application state
    let state = AppState::new(config.clone())?;
    tracing::info!("Initialized application state");

    // Create router
    let app = create_router(state);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

/// Initialize tracing from the observability settings
fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("narrator={},tower_http=debug", level).into()
    });

    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
