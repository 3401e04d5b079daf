//! Gateway event handler — bridges serenity events to the agent.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rollcall_agent::{
    AdminCommand, BotState, CheckinHandler, CommandReply, CommandRouter, Invoker, PromptDispatcher,
};
use rollcall_channels::{DiscordChannel, is_guild_admin};
use rollcall_core::RollcallError;
use rollcall_scheduler::{SchedulerEngine, spawn_scheduler};
use serenity::async_trait;
use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::model::application::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

pub struct Handler {
    state: Arc<BotState>,
    engine: Arc<Mutex<SchedulerEngine>>,
    tick_secs: u64,
    command_prefix: String,
    scheduler_started: AtomicBool,
}

impl Handler {
    pub fn new(
        state: Arc<BotState>,
        engine: Arc<Mutex<SchedulerEngine>>,
        tick_secs: u64,
        command_prefix: String,
    ) -> Self {
        Self {
            state,
            engine,
            tick_secs,
            command_prefix,
            scheduler_started: AtomicBool::new(false),
        }
    }

    fn dispatcher(&self, ctx: &Context) -> PromptDispatcher {
        PromptDispatcher::new(
            Arc::clone(&self.state),
            Arc::new(DiscordChannel::new(ctx.http.clone())),
        )
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 {} 已連接到 Discord!", ready.user.name);

        // Gateway reconnects fire `ready` again; the scheduler runs once.
        if self.scheduler_started.swap(true, Ordering::SeqCst) {
            debug!("Scheduler already running, skipping start");
            return;
        }

        let dispatcher = self.dispatcher(&ctx);
        tokio::spawn(spawn_scheduler(
            Arc::clone(&self.engine),
            move |fired| {
                let dispatcher = dispatcher.clone();
                async move { dispatcher.dispatch_fired(fired).await }
            },
            self.tick_secs,
        ));
        info!("⏰ 簽到任務已啟動");
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Component(component) = interaction else {
            return;
        };

        let checkin = CheckinHandler::new(Arc::clone(&self.state));
        let Some(reply) = checkin
            .handle(&component.user.name, &component.data.custom_id)
            .await
        else {
            debug!("Ignoring component {}", component.data.custom_id);
            return;
        };

        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(reply)
                .ephemeral(true),
        );
        if let Err(e) = component.create_response(&ctx, response).await {
            error!("❌ Failed to acknowledge {}: {e}", component.user.name);
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(command) = AdminCommand::parse(&msg.content, &self.command_prefix) else {
            return;
        };

        let invoker = Invoker {
            name: msg.author.name.clone(),
            is_admin: is_guild_admin(&ctx, &msg).await,
        };
        let channel = DiscordChannel::new(ctx.http.clone());
        let router = CommandRouter::new(self.dispatcher(&ctx));
        let reply_to = msg.channel_id.get();

        let sent = match router.execute(command, &invoker).await {
            Ok(CommandReply::Text(text)) => channel.send_text(reply_to, &text).await,
            Ok(CommandReply::File { content, path }) => {
                channel.send_file(reply_to, &content, &path).await
            }
            // Denials are logged by the router; the invoker gets no reply.
            Err(RollcallError::PermissionDenied(_)) => return,
            Err(e) => {
                error!("❌ !{} failed: {e}", command.name());
                return;
            }
        };
        if let Err(e) = sent {
            error!("❌ Reply to !{} failed: {e}", command.name());
        }
    }
}
