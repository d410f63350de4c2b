// src/shutdown.rs
// =============================================================================
// Interrupt handling.
//
// A background task waits for SIGINT / SIGTERM (Ctrl+C elsewhere) and cancels
// the run's CancellationToken. main.rs races every remaining step (crawl,
// logout) against that token. Whatever file was being written at that moment
// may be left incomplete.
//
// Once the handlers are installed the default "kill the process" behaviour is
// gone, so a second signal exits directly instead of being swallowed.
//
// Rust concepts:
// - tokio::select!: wait on two futures, keep whichever finishes first
// - Generic async fn over `F: Future`: works for any step we want to race
// =============================================================================

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Exit code for a run stopped by a signal.
pub const EXIT_INTERRUPTED: i32 = 1;

/// Spawns the listener; the returned token is cancelled on the first signal.
pub fn listen() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.cancel();

        wait_for_signal().await;
        tracing::warn!("second interrupt, exiting without waiting for logout");
        std::process::exit(EXIT_INTERRUPTED);
    });
    token
}

// Runs `work` until it finishes or `cancel` fires
//
// Returns:
//   Some(output) = work finished first
//   None         = cancelled (work is dropped mid-way)
pub async fn until_cancelled<F>(cancel: &CancellationToken, work: F) -> Option<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = work => Some(output),
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    // Registration can fail in restricted environments
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("received SIGTERM"),
                _ = sigint.recv() => tracing::info!("received SIGINT"),
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "could not register signal handlers, using ctrl_c");
            if tokio::signal::ctrl_c().await.is_err() {
                // Never resolve: without a handler there is nothing to wait for
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl+C"),
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
