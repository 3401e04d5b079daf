//! Shutdown routine — bounded best-effort purge of the prompt channel.

use std::time::Duration;

use crate::dispatcher::PromptDispatcher;

/// Purge the channel's recent messages, giving up after `timeout`.
///
/// Returns how many messages were deleted, or `None` if the purge failed or
/// timed out. Never panics; the connection may already be degraded.
pub async fn shutdown_purge(dispatcher: &PromptDispatcher, timeout: Duration) -> Option<usize> {
    tracing::info!("🧹 Purging channel before exit (timeout {}s)", timeout.as_secs());
    match tokio::time::timeout(timeout, dispatcher.purge_channel()).await {
        Ok(deleted) => deleted,
        Err(_) => {
            tracing::warn!("⚠️ Shutdown purge timed out after {}s", timeout.as_secs());
            None
        }
    }
}
