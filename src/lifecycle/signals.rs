//! OS signal handling.
//!
//! SIGINT and SIGTERM cancel the root [`Context`]; everything derived from it
//! (pending connection attempts, schema workers, the diagnostics server)
//! observes the cancellation at its next suspension point.

use tokio::task::JoinHandle;

use crate::lifecycle::Context;

/// Wait for SIGINT or SIGTERM and return the signal's name.
pub async fn wait_for_termination() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|()| "ctrl-c")
    }
}

/// Spawn a task that cancels `ctx` on the first termination signal.
pub fn cancel_on_signal(ctx: Context) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = wait_for_termination() => match result {
                Ok(signal) => tracing::info!(signal, "Shutdown signal received"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install signal handler");
                    return;
                }
            },
            _ = ctx.done() => return,
        }
        ctx.cancel();
    })
}
