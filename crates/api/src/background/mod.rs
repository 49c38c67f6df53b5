//! Background tasks.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. All tasks accept a [`CancellationToken`]
//! for graceful shutdown.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

use std::time::Duration;

use tokio::task::JoinHandle;

pub mod oauth_state_eviction;

/// Wait up to `timeout` for a cancelled background task to finish.
///
/// Returns `true` when the task stopped cleanly in time. A task that
/// overruns the grace period or panicked is logged and reported as `false`.
pub async fn join_with_timeout(name: &str, handle: JoinHandle<()>, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(())) => {
            tracing::info!(task = name, "Background task stopped");
            true
        }
        Ok(Err(e)) => {
            tracing::error!(task = name, error = %e, "Background task failed");
            false
        }
        Err(_) => {
            tracing::warn!(
                task = name,
                timeout_secs = timeout.as_secs(),
                "Background task did not stop within the shutdown timeout"
            );
            false
        }
    }
}
