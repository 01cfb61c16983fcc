//! Graceful-shutdown trigger for the API server.

/// Resolves once the process is asked to stop, so axum can drain in-flight
/// requests before the listener closes.
#[cfg(unix)]
pub(crate) async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let wait = |kind: SignalKind, name: &'static str| async move {
        match signal(kind) {
            Ok(mut stream) => {
                stream.recv().await;
                name
            }
            Err(err) => {
                tracing::error!(error = %err, signal = name, "Failed to install signal handler");
                std::future::pending().await
            }
        }
    };

    let received = tokio::select! {
        name = wait(SignalKind::interrupt(), "SIGINT") => name,
        name = wait(SignalKind::terminate(), "SIGTERM") => name,
    };

    tracing::info!(signal = received, "shutdown requested, draining in-flight requests");
}

#[cfg(not(unix))]
pub(crate) async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }

    tracing::info!(signal = "ctrl_c", "shutdown requested, draining in-flight requests");
}
