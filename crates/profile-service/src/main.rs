//! Profile Service Binary
//!
//! Runs the profile HTTP server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use profile_service::{create_router, storage, AppState, ProfileService, ServiceConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = ServiceConfig::from_env().expect("Invalid configuration");

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Token verification
    let verifier = config.auth.build_verifier();

    // Initialize storage
    let store = storage::connect(config.database_url.as_deref())
        .await
        .expect("Failed to open profile store");

    info!(
        auth = config.auth.mode(),
        backend = store.backend(),
        port = config.port,
        "Starting profile service"
    );

    let state = Arc::new(AppState::new(verifier, ProfileService::new(store)));
    let app = create_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "Profile service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    info!("Profile service stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
