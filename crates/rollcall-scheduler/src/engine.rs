//! Scheduler Engine — the loop that checks and fires daily triggers.
//! Uses tokio::interval for ticking; idle cost is one wake-up per tick.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Local};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;

use rollcall_core::config::ScheduleConfig;
use rollcall_core::error::Result;
use rollcall_core::types::Period;

use crate::tasks::{DailyTrigger, FiredPrompt};

/// The scheduler engine — owns the triggers and the message RNG.
pub struct SchedulerEngine {
    triggers: Vec<DailyTrigger>,
    rng: StdRng,
}

impl SchedulerEngine {
    /// Empty engine with an entropy-seeded RNG.
    pub fn new() -> Self {
        Self {
            triggers: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Empty engine with a fixed RNG seed (deterministic message picks).
    pub fn with_seed(seed: u64) -> Self {
        Self {
            triggers: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Engine with the morning and evening triggers from config.
    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        let mut engine = Self::new();
        for period in [Period::Morning, Period::Evening] {
            let trigger = DailyTrigger::from_config(period, &config.trigger(period))?;
            engine.add_trigger(trigger);
        }
        Ok(engine)
    }

    /// Add a trigger and schedule its first run.
    pub fn add_trigger(&mut self, trigger: DailyTrigger) {
        self.add_trigger_at(trigger, &Local::now());
    }

    fn add_trigger_at(&mut self, mut trigger: DailyTrigger, now: &DateTime<Local>) {
        trigger.schedule_after(now);
        tracing::info!(
            "📅 Trigger added: {} at {} (next: {})",
            trigger.period,
            trigger.at.format("%H:%M"),
            trigger
                .next_run
                .map(|n| n.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".into())
        );
        self.triggers.push(trigger);
    }

    /// List all triggers.
    pub fn triggers(&self) -> &[DailyTrigger] {
        &self.triggers
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }

    /// Tick against the current local time.
    pub fn tick(&mut self) -> Vec<FiredPrompt> {
        self.tick_at(Local::now())
    }

    /// Fire every due trigger and reschedule it for its next wall-clock occurrence.
    ///
    /// A trigger that was due several times (e.g. after a suspend) fires once.
    pub fn tick_at(&mut self, now: DateTime<Local>) -> Vec<FiredPrompt> {
        let mut fired = Vec::new();

        for trigger in self.triggers.iter_mut() {
            if !trigger.should_run(&now) {
                continue;
            }

            tracing::info!("🔔 Trigger fired: {}", trigger.period);
            trigger.last_run = Some(now);
            trigger.run_count += 1;
            trigger.schedule_after(&now);

            match trigger.pick_message(&mut self.rng) {
                Some(message) => fired.push(FiredPrompt {
                    period: trigger.period,
                    message: message.to_string(),
                    button_label: trigger.button_label.clone(),
                }),
                None => tracing::warn!("⚠️ Trigger {} has no messages", trigger.period),
            }
        }

        fired
    }
}

impl Default for SchedulerEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the scheduler loop, handing each fired prompt to `dispatch`.
///
/// Dispatch errors are logged; the schedule carries on unaffected.
pub async fn spawn_scheduler<F, Fut>(
    engine: Arc<Mutex<SchedulerEngine>>,
    dispatch: F,
    tick_secs: u64,
) where
    F: Fn(FiredPrompt) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send,
{
    tracing::info!("⏰ Scheduler started (check every {}s)", tick_secs);

    let mut interval = tokio::time::interval(std::time::Duration::from_secs(tick_secs.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let fired = {
            let mut eng = engine.lock().await;
            eng.tick()
        };

        for prompt in fired {
            let period = prompt.period;
            if let Err(e) = dispatch(prompt).await {
                tracing::error!("❌ Scheduled {} prompt failed: {e}", period);
            }
        }
    }
}
