//! Graceful shutdown signal handling.
//!
//! The server stops accepting new deliveries on SIGINT/SIGTERM and lets
//! in-flight invocations finish before the process exits.

use tokio::signal;

/// Which signal ended the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
}

impl ShutdownReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::Interrupt => "interrupt",
            ShutdownReason::Terminate => "terminate",
        }
    }
}

/// Resolve once SIGINT or SIGTERM is received.
///
/// If a handler cannot be installed that branch never resolves, so the other
/// signal still works.
pub async fn wait_for_signal() -> ShutdownReason {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => ShutdownReason::Interrupt,
        _ = terminate => ShutdownReason::Terminate,
    }
}

/// Future for `axum::serve(..).with_graceful_shutdown`
pub async fn shutdown_signal() {
    let reason = wait_for_signal().await;
    tracing::info!(reason = reason.as_str(), "Shutdown signal received, draining in-flight invocations");
}
