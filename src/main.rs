//! Exam Activity Cache - clustered live exam monitoring store
//!
//! Server binary exposing action ingestion and cleanup scheduling over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exam_activity_cache::api::create_router;
use exam_activity_cache::ports::{BroadcastMessaging, InMemoryExamRepository};
use exam_activity_cache::{AppState, Config, ScheduleService};

/// Main entry point for the exam activity server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Load exam metadata and create the schedule service
/// 4. Recover cleanup timers lost by a restart
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exam_activity_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Exam Activity Cache Server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, grace_delay={}s, production={}, scheduling={}",
        config.server_port, config.grace_delay_secs, config.is_production, config.is_scheduling_node
    );

    let repository = match &config.exam_seed_path {
        Some(path) => InMemoryExamRepository::from_seed_file(path)
            .await
            .context("failed to load exam seed file")?,
        None => InMemoryExamRepository::new(),
    };
    let messaging = BroadcastMessaging::default();

    // Create application state with schedule service
    let state = AppState::from_config(&config, Arc::new(repository), Arc::new(messaging));
    info!("Exam activity cache initialized");

    // Recover cleanup timers
    if let Err(e) = state.service.startup_recovery().await {
        warn!("Startup recovery failed: {}", e);
    }

    // Create router with all endpoints
    let app = create_router(state.clone());

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&state.service)))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, cancels this node's cleanup timers and allows graceful shutdown.
async fn shutdown_signal(service: Arc<ScheduleService>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Timers are re-created by startup recovery on the next start
    service.shutdown();
}
