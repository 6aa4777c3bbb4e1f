//! Insert Coin - A state-managed HTTP server for arcade play-time sessions
//!
//! This is the main entry point for the insert-coin application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use insert_coin::{
    api::create_router,
    config::Config,
    state::AppState,
    storage::{FileStore, SnapshotStore},
    tasks::{countdown_task, wake_recovery_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("insert_coin={},tower_http=info", config.log_level()))
        .init();

    info!("Starting insert-coin server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, snapshot={}",
        config.host,
        config.port,
        config.snapshot.display()
    );

    // Create application state, restoring any persisted session
    let store: Arc<dyn SnapshotStore> = Arc::new(FileStore::new(config.snapshot.clone()));
    let state = Arc::new(AppState::new(config.port, config.host.clone(), store));

    // Start the countdown background task; it picks up a restored balance
    // on its own and otherwise waits for the first quarter
    let countdown_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_task(countdown_state).await;
    });

    // Start the wake recovery task (foreground-restore lifecycle events)
    let recovery_state = Arc::clone(&state);
    tokio::spawn(async move {
        wake_recovery_task(recovery_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /quarter         - Spend one quarter for 15 minutes of playtime");
    info!("  POST /quarters/credit - Credit purchased quarters");
    info!("  GET  /status          - Check playtime balance and quarter accounting");
    info!("  GET  /health          - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Termination lifecycle: reclassify a quarter still inside its risk
    // window and write the final snapshot before the process exits
    if let Err(e) = state.on_terminating() {
        tracing::error!("Failed to finalize session state: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
