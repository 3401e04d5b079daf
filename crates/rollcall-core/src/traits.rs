//! Channel trait — the seam between Rollcall and the chat platform.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::OutgoingPrompt;

/// The handful of platform primitives the bot needs.
///
/// Implementations own connection state, rate limiting and delivery; callers
/// trust their results.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Channel name (for logging).
    fn name(&self) -> &str;

    /// Whether `channel_id` resolves to a channel the bot can post into.
    async fn resolve(&self, channel_id: u64) -> Result<bool>;

    /// Delete up to `limit` of the most recent messages. Returns how many went.
    async fn purge_recent(&self, channel_id: u64, limit: u8) -> Result<usize>;

    /// Post a prompt with its button. Returns the new message id.
    async fn send_prompt(&self, channel_id: u64, prompt: &OutgoingPrompt) -> Result<u64>;
}
