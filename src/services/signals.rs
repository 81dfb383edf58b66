use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::services::manager::ServiceManager;
use crate::utils::fmt_duration;

/// Run until a shutdown signal arrives or a service exits on its own, then shut
/// every service down within `shutdown_timeout`.
pub async fn handle_shutdown_signals(
    mut service_manager: ServiceManager,
    shutdown_timeout: Duration,
) -> ExitCode {
    let mut exit_code = tokio::select! {
        (name, result) = service_manager.wait_any() => {
            match result {
                Ok(()) => warn!(service = name, "Service exited unexpectedly"),
                Err(e) => error!(service = name, error = ?e, "Service failed"),
            }
            ExitCode::FAILURE
        }
        signal = shutdown_signal() => {
            info!(signal, "Received shutdown signal, shutting down");
            ExitCode::SUCCESS
        }
    };

    match service_manager.shutdown(shutdown_timeout).await {
        Ok(elapsed) => info!(elapsed = fmt_duration(elapsed), "Graceful shutdown complete"),
        Err(aborted) => {
            warn!(aborted, "Graceful shutdown incomplete");
            exit_code = ExitCode::FAILURE;
        }
    }

    exit_code
}

/// Resolve on Ctrl+C, or SIGTERM on Unix. Returns the signal name.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = ?e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = ?e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
