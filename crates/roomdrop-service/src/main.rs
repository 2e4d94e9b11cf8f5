//! Roomdrop Service
//!
//! Entry point for the Roomdrop file drop service. Hosts create short-lived,
//! password-protected rooms and share files with everyone who joins.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment
//! 2. Initialize Prometheus metrics recorder
//! 3. Initialize in-memory stores and the disk blob store
//! 4. Spawn the room expiry sweep task
//! 5. Serve HTTP until a shutdown signal arrives

use roomdrop_core::store::{MemoryStore, RoomStore};
use roomdrop_core::{
    identity::Identity, ledger::FileLedger, registry::RoomRegistry, sessions::Sessions,
    sweeper::{start_expiry_sweep, ExpirySweepConfig},
};
use roomdrop_service::blobs::DiskBlobs;
use roomdrop_service::config::Config;
use roomdrop_service::observability::metrics::init_metrics_recorder;
use roomdrop_service::routes::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomdrop_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Roomdrop service");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        public_base_url = %config.public_base_url,
        upload_dir = %config.upload_dir.display(),
        max_upload_bytes = config.max_upload_bytes,
        "Configuration loaded successfully"
    );

    // Install the Prometheus metrics recorder before any metrics are recorded
    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to install Prometheus metrics recorder: {}", e);
        e
    })?;

    // All account, session, room, and ledger state lives in one in-memory
    // store; file content goes to disk
    let store = Arc::new(MemoryStore::new());
    let identity = Identity::new(store.clone());
    let sessions = Sessions::new(store.clone(), store.clone());
    let registry = RoomRegistry::new(store.clone(), store.clone());
    let ledger = FileLedger::new(store.clone(), store.clone());

    let blobs = DiskBlobs::new(config.upload_dir.clone()).await.map_err(|e| {
        error!("Failed to initialize upload directory: {}", e);
        e
    })?;

    // Spawn the expiry sweep task with a cancellation token for shutdown
    let cancel_token = CancellationToken::new();
    let sweep_rooms: Arc<dyn RoomStore> = store.clone();
    let sweeper_handle = tokio::spawn(start_expiry_sweep(
        sweep_rooms,
        ExpirySweepConfig::from_env(),
        cancel_token.clone(),
    ));

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    // Create application state
    let state = Arc::new(AppState {
        identity,
        sessions,
        registry,
        ledger,
        blobs: Arc::new(blobs),
        config,
    });

    // Build application routes
    let app = routes::build_routes(state, metrics_handle);

    // Parse bind address
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Roomdrop service listening on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the expiry sweep task
    cancel_token.cancel();
    if let Err(e) = sweeper_handle.await {
        warn!("Expiry sweep task join error: {}", e);
    }

    info!("Roomdrop service shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
/// Returns when a shutdown signal is received and drain period is complete.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    // Graceful shutdown drain period, for load balancer deregistration
    let drain_secs: u64 = std::env::var("RD_DRAIN_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    if drain_secs > 0 {
        warn!("Draining connections for {} seconds...", drain_secs);
        tokio::time::sleep(Duration::from_secs(drain_secs)).await;
        info!("Drain period complete");
    }
}
