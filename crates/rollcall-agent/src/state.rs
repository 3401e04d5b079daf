//! Shared bot state: the ledger and the live prompt slot.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, FixedOffset, Utc};
use rollcall_core::config::RollcallConfig;
use rollcall_core::error::Result;
use rollcall_core::types::PromptState;
use rollcall_ledger::Ledger;

/// Static settings the handlers need at runtime.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub channel_id: u64,
    pub purge_limit: u8,
    /// Timezone of ledger timestamps.
    pub offset: FixedOffset,
}

impl BotSettings {
    pub fn from_config(config: &RollcallConfig) -> Result<Self> {
        Ok(Self {
            channel_id: config.discord.channel_id,
            purge_limit: config.discord.purge_limit,
            offset: config.ledger.offset()?,
        })
    }
}

/// Owned store for everything the handlers share.
pub struct BotState {
    pub settings: BotSettings,
    pub ledger: Ledger,
    prompt: Mutex<Option<PromptState>>,
}

impl BotState {
    pub fn new(settings: BotSettings, ledger: Ledger) -> Self {
        Self {
            settings,
            ledger,
            prompt: Mutex::new(None),
        }
    }

    /// Open the ledger directory named in config and build the state.
    pub fn from_config(config: &RollcallConfig) -> Result<Self> {
        let settings = BotSettings::from_config(config)?;
        let ledger = Ledger::open(&config.ledger.records_path())?;
        Ok(Self::new(settings, ledger))
    }

    fn prompt_slot(&self) -> MutexGuard<'_, Option<PromptState>> {
        self.prompt.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make `next` the live prompt, returning the one it replaces.
    pub fn replace_prompt(&self, next: PromptState) -> Option<PromptState> {
        self.prompt_slot().replace(next)
    }

    pub fn current_prompt(&self) -> Option<PromptState> {
        self.prompt_slot().clone()
    }

    /// Current wall-clock time in the ledger timezone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.settings.offset)
    }
}
