//! Prompt dispatch — clear the channel, post a fresh prompt, track it.

use std::sync::Arc;

use chrono::Utc;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::traits::ChatChannel;
use rollcall_core::types::{OutgoingPrompt, Period, PromptState};
use rollcall_scheduler::FiredPrompt;

use crate::state::BotState;

/// Posts check-in prompts into the configured channel.
#[derive(Clone)]
pub struct PromptDispatcher {
    state: Arc<BotState>,
    channel: Arc<dyn ChatChannel>,
}

impl PromptDispatcher {
    pub fn new(state: Arc<BotState>, channel: Arc<dyn ChatChannel>) -> Self {
        Self { state, channel }
    }

    pub fn state(&self) -> &Arc<BotState> {
        &self.state
    }

    /// Make sure the target channel exists before touching it.
    async fn resolve_target(&self) -> Result<u64> {
        let channel_id = self.state.settings.channel_id;
        match self.channel.resolve(channel_id).await {
            Ok(true) => Ok(channel_id),
            Ok(false) => {
                tracing::error!("❌ 無法找到頻道 ID: {channel_id}");
                Err(RollcallError::Channel(format!("channel {channel_id} not found")))
            }
            Err(e) => {
                tracing::error!("❌ Resolving channel {channel_id} failed: {e}");
                Err(e)
            }
        }
    }

    /// Best-effort purge of the recent message window. Never fails.
    async fn purge_resolved(&self, channel_id: u64) -> Option<usize> {
        match self
            .channel
            .purge_recent(channel_id, self.state.settings.purge_limit)
            .await
        {
            Ok(deleted) => {
                tracing::info!("🧹 已刪除 {deleted} 則訊息");
                Some(deleted)
            }
            Err(e) => {
                tracing::error!("⚠️ 清空頻道訊息時發生錯誤: {e}");
                None
            }
        }
    }

    /// Resolve the channel and purge its recent messages.
    pub async fn purge_channel(&self) -> Option<usize> {
        let channel_id = self.resolve_target().await.ok()?;
        self.purge_resolved(channel_id).await
    }

    /// Clear the channel and post a new prompt, replacing the tracked one.
    ///
    /// Purge failures are logged and skipped. An unresolved channel or a failed
    /// post aborts the dispatch and leaves the previous prompt tracked.
    pub async fn dispatch(
        &self,
        message: &str,
        period: Period,
        button_label: &str,
    ) -> Result<PromptState> {
        let channel_id = self.resolve_target().await?;
        self.purge_resolved(channel_id).await;

        let prompt = OutgoingPrompt::new(message, period, button_label);
        let message_id = self
            .channel
            .send_prompt(channel_id, &prompt)
            .await
            .inspect_err(|e| tracing::error!("❌ 發送消息時發生錯誤: {e}"))?;

        let posted = PromptState {
            channel_id,
            message_id,
            control_id: prompt.control_id,
            period,
            posted_at: Utc::now(),
        };
        if let Some(previous) = self.state.replace_prompt(posted.clone()) {
            tracing::debug!("Prompt {} no longer tracked", previous.message_id);
        }
        tracing::info!("📨 {}消息已發送 (message {message_id})", period.label());
        Ok(posted)
    }

    /// Scheduler entry point.
    pub async fn dispatch_fired(&self, fired: FiredPrompt) -> Result<()> {
        self.dispatch(&fired.message, fired.period, &fired.button_label)
            .await
            .map(|_| ())
    }
}
