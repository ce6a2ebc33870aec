//! InfraView resource plugin host
//!
//! Wires the resource provider, the in-memory backend and the informer
//! together and runs until a shutdown signal is received.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing_subscriber::{EnvFilter, fmt};

use infraview_core::config::AppConfig;
use infraview_core::error::AppError;
use infraview_informer::ResourceInformer;
use infraview_plugin::{MemoryBackend, ResourceProvider};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("INFRAVIEW_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main host run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting InfraView v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Backend with change event queue ──────────────────
    let (events_tx, events_rx) = mpsc::channel(config.informer.event_queue_size.max(1));
    let backend =
        MemoryBackend::new(config.backend.resources.iter().cloned()).with_events(events_tx);
    for resource in &config.backend.resources {
        tracing::info!(resource = %resource.id, scope = ?resource.scope, "Serving resource");
    }

    // ── Step 2: Resource provider ────────────────────────────────
    // Wiring skeleton: the provider is held until shutdown for a transport
    // layer to call into; hooks are registered on it before serving.
    let provider = ResourceProvider::new(Arc::new(backend), &config.hooks);
    tracing::info!(
        timeout_ms = config.hooks.timeout_ms,
        hook_buckets = provider.registry().registered_buckets().len(),
        "Resource provider ready"
    );

    // ── Step 3: Informer and dispatcher pump ─────────────────────
    let informer = ResourceInformer::new(&config.informer);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let dispatcher = informer.dispatcher().clone();
    let pump = tokio::spawn(async move {
        dispatcher.run(events_rx, shutdown_rx).await;
    });

    // ── Step 4: Wait for shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping informer...");
    let _ = shutdown_tx.send(true);

    drop(provider);
    pump.await
        .map_err(|e| AppError::internal(format!("Informer task failed: {}", e)))?;

    tracing::info!("InfraView stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
