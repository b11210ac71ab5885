use anyhow::Result;
use tokio::net::TcpListener;

use firestore_push_forwarder::config::Settings;
use firestore_push_forwarder::server::{create_app, AppState};
use firestore_push_forwarder::shutdown::shutdown_signal;
use firestore_push_forwarder::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    let _telemetry = init_telemetry(&settings.otel, &settings.log)?;
    tracing::info!("Configuration loaded");

    // One-time provider initialization, kept for the process lifetime
    let state = AppState::new(settings.clone())?;
    tracing::info!(
        project_id = %state.provider.project_id,
        pattern = %state.pattern,
        "Application state initialized"
    );

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
