//! Discord channel — REST primitives over serenity's `Http` client.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::traits::ChatChannel;
use rollcall_core::types::OutgoingPrompt;
use serenity::builder::{
    CreateActionRow, CreateAttachment, CreateButton, CreateMessage, GetMessages,
};
use serenity::http::Http;
use serenity::model::application::ButtonStyle;
use serenity::model::channel::{Channel, Message};
use serenity::model::id::{ChannelId, MessageId};
use serenity::prelude::Context;

/// Discord refuses bulk deletes of messages older than 14 days.
const BULK_DELETE_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60;

fn channel_err(action: &str, e: serenity::Error) -> RollcallError {
    RollcallError::Channel(format!("Discord {action} failed: {e}"))
}

/// Discord implementation of the bot's channel primitives.
#[derive(Clone)]
pub struct DiscordChannel {
    http: Arc<Http>,
}

impl DiscordChannel {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Plain text reply.
    pub async fn send_text(&self, channel_id: u64, text: &str) -> Result<()> {
        ChannelId::new(channel_id)
            .say(&self.http, text)
            .await
            .map_err(|e| channel_err("send", e))?;
        Ok(())
    }

    /// Text reply with one file attached.
    pub async fn send_file(&self, channel_id: u64, text: &str, path: &Path) -> Result<()> {
        let attachment = CreateAttachment::path(path)
            .await
            .map_err(|e| channel_err("attach", e))?;
        let builder = CreateMessage::new().content(text).add_file(attachment);
        ChannelId::new(channel_id)
            .send_message(&self.http, builder)
            .await
            .map_err(|e| channel_err("send file", e))?;
        Ok(())
    }

    /// Bulk-delete what Discord allows, then delete the rest one by one.
    async fn delete_all(&self, channel: ChannelId, messages: &[Message]) -> Result<usize> {
        let stamped: Vec<(MessageId, i64)> = messages
            .iter()
            .map(|m| (m.id, m.timestamp.unix_timestamp()))
            .collect();
        let plan = PurgePlan::new(&stamped, chrono::Utc::now().timestamp());

        if !plan.bulk.is_empty() {
            channel
                .delete_messages(&self.http, plan.bulk.iter().copied())
                .await
                .map_err(|e| channel_err("bulk delete", e))?;
        }
        for id in &plan.single {
            channel
                .delete_message(&self.http, *id)
                .await
                .map_err(|e| channel_err("delete", e))?;
        }

        Ok(plan.len())
    }
}

/// How a batch of messages gets deleted.
///
/// The bulk endpoint takes 2 to 100 messages younger than 14 days. A lone
/// recent message and anything older go through single deletes.
#[derive(Debug, PartialEq, Eq)]
struct PurgePlan<T> {
    bulk: Vec<T>,
    single: Vec<T>,
}

impl<T: Copy> PurgePlan<T> {
    /// Split `(id, unix timestamp)` pairs against `now`.
    fn new(messages: &[(T, i64)], now: i64) -> Self {
        let cutoff = now - BULK_DELETE_MAX_AGE_SECS;
        let (recent, old): (Vec<&(T, i64)>, Vec<&(T, i64)>) = messages.iter().partition(|(_, ts)| *ts > cutoff);
        let mut plan = Self {
            bulk: recent.into_iter().map(|(id, _)| *id).collect(),
            single: old.into_iter().map(|(id, _)| *id).collect(),
        };
        if plan.bulk.len() == 1 {
            plan.single.insert(0, plan.bulk.remove(0));
        }
        plan
    }

    fn len(&self) -> usize {
        self.bulk.len() + self.single.len()
    }
}

#[async_trait]
impl ChatChannel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn resolve(&self, channel_id: u64) -> Result<bool> {
        if channel_id == 0 {
            return Ok(false);
        }
        match ChannelId::new(channel_id).to_channel(&self.http).await {
            Ok(Channel::Guild(_)) => Ok(true),
            Ok(_) => Ok(false),
            Err(e) => Err(channel_err("channel lookup", e)),
        }
    }

    async fn purge_recent(&self, channel_id: u64, limit: u8) -> Result<usize> {
        let channel = ChannelId::new(channel_id);
        let messages = channel
            .messages(&self.http, GetMessages::new().limit(limit))
            .await
            .map_err(|e| channel_err("history fetch", e))?;
        tracing::debug!("Fetched {} messages from {channel_id} for purge", messages.len());
        self.delete_all(channel, &messages).await
    }

    async fn send_prompt(&self, channel_id: u64, prompt: &OutgoingPrompt) -> Result<u64> {
        let button = CreateButton::new(prompt.control_id.clone())
            .label(prompt.button_label.clone())
            .style(ButtonStyle::Primary);
        let builder = CreateMessage::new()
            .content(prompt.content.clone())
            .components(vec![CreateActionRow::Buttons(vec![button])]);

        let message = ChannelId::new(channel_id)
            .send_message(&self.http, builder)
            .await
            .map_err(|e| channel_err("send prompt", e))?;
        Ok(message.id.get())
    }
}

/// Whether the author of `msg` holds Administrator in the message's guild.
///
/// Direct messages and lookups that fail count as not administrator.
pub async fn is_guild_admin(ctx: &Context, msg: &Message) -> bool {
    let Some(guild_id) = msg.guild_id else {
        return false;
    };
    let member = match guild_id.member(ctx, msg.author.id).await {
        Ok(member) => member,
        Err(e) => {
            tracing::warn!("⚠️ Member lookup for {} failed: {e}", msg.author.name);
            return false;
        }
    };
    ctx.cache
        .guild(guild_id)
        .map(|guild| guild.member_permissions(&member).administrator())
        .unwrap_or(false)
}
