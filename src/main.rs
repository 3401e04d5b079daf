//! # Rollcall — daily check-in bot
//!
//! Posts a morning and an evening check-in prompt into one Discord channel,
//! records button clicks to a day-partitioned CSV ledger, and serves three
//! administrator commands.
//!
//! Usage:
//!   rollcall                             # Reads DISCORD_TOKEN / CHANNEL_ID (and .env)
//!   rollcall --config rollcall.toml      # Custom times, captions and messages
//!   rollcall --records-dir /var/lib/rollcall --verbose

mod handler;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use rollcall_agent::{BotState, PromptDispatcher, shutdown_purge};
use rollcall_channels::DiscordChannel;
use rollcall_core::RollcallConfig;
use rollcall_scheduler::SchedulerEngine;
use serenity::prelude::*;
use tracing_subscriber::EnvFilter;

use handler::Handler;

#[derive(Parser)]
#[command(
    name = "rollcall",
    version,
    about = "📋 Rollcall — daily check-in prompts for a Discord channel"
)]
struct Cli {
    /// Config file (default: ~/.rollcall/config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for check-in CSV files
    #[arg(long)]
    records_dir: Option<String>,

    /// Leave the channel untouched on exit
    #[arg(long)]
    no_purge_on_exit: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    let filter = format!("{level},serenity=warn,tungstenite=warn");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<RollcallConfig> {
    let mut config = match &cli.config {
        Some(path) => RollcallConfig::load_from(path)?,
        None => RollcallConfig::load()?,
    };
    config.apply_env()?;
    if let Some(dir) = &cli.records_dir {
        config.ledger.records_dir = dir.clone();
    }
    if cli.no_purge_on_exit {
        config.shutdown.purge_on_exit = false;
    }
    Ok(config)
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("⚠️ SIGTERM handler unavailable: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(&cli).context("Failed to load configuration")?;
    init_logging(&config.log_level, cli.verbose);
    config.validate().context("Invalid configuration")?;

    let state = Arc::new(BotState::from_config(&config).context("Failed to open ledger")?);
    let engine = SchedulerEngine::from_config(&config.schedule)
        .context("Failed to build schedule")?;
    for trigger in engine.triggers() {
        tracing::info!(
            "   {} prompt at {} ({} messages)",
            trigger.period,
            trigger.at.format("%H:%M"),
            trigger.messages.len()
        );
    }

    let handler = Handler::new(
        Arc::clone(&state),
        Arc::new(tokio::sync::Mutex::new(engine)),
        config.schedule.tick_secs,
        config.discord.command_prefix.clone(),
    );

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&config.discord.token, intents)
        .event_handler(handler)
        .await
        .context("Failed to create Discord client")?;

    tracing::info!(
        "📋 Rollcall v{} — channel {}, records in {}",
        env!("CARGO_PKG_VERSION"),
        config.discord.channel_id,
        state.ledger.dir().display()
    );

    let shard_manager = Arc::clone(&client.shard_manager);
    let dispatcher = PromptDispatcher::new(
        Arc::clone(&state),
        Arc::new(DiscordChannel::new(Arc::clone(&client.http))),
    );
    let shutdown = config.shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("🛑 Shutdown requested");
        if shutdown.purge_on_exit {
            shutdown_purge(&dispatcher, Duration::from_secs(shutdown.timeout_secs)).await;
        }
        shard_manager.shutdown_all().await;
    });

    client.start().await.context("Discord client error")?;

    tracing::info!("👋 Rollcall stopped ({} check-ins this run)", state.ledger.len());
    Ok(())
}
