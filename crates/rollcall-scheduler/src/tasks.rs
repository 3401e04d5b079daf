//! Trigger definitions — one recurring prompt per period.

use chrono::{DateTime, Local, NaiveTime};
use rand::Rng;
use rand::seq::SliceRandom;

use rollcall_core::config::TriggerConfig;
use rollcall_core::error::Result;
use rollcall_core::types::Period;

use crate::cron;

/// A prompt that fires every day at a fixed local time.
#[derive(Debug, Clone)]
pub struct DailyTrigger {
    pub period: Period,
    /// Local wall-clock time of day.
    pub at: NaiveTime,
    pub button_label: String,
    /// Candidate messages; one is picked uniformly per fire.
    pub messages: Vec<String>,
    pub last_run: Option<DateTime<Local>>,
    pub next_run: Option<DateTime<Local>>,
    pub run_count: u32,
}

/// What a trigger hands to the dispatcher when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredPrompt {
    pub period: Period,
    pub message: String,
    pub button_label: String,
}

impl DailyTrigger {
    pub fn new(period: Period, at: NaiveTime, button_label: &str, messages: Vec<String>) -> Self {
        Self {
            period,
            at,
            button_label: button_label.to_string(),
            messages,
            last_run: None,
            next_run: None,
            run_count: 0,
        }
    }

    /// Build from resolved config for `period`.
    pub fn from_config(period: Period, config: &TriggerConfig) -> Result<Self> {
        Ok(Self::new(
            period,
            config.time()?,
            &config.button_label,
            config.messages.clone(),
        ))
    }

    /// Default morning trigger (09:00, three greetings).
    pub fn morning() -> Self {
        Self::defaults_for(Period::Morning)
    }

    /// Default evening trigger (18:00, three good-nights).
    pub fn evening() -> Self {
        Self::defaults_for(Period::Evening)
    }

    fn defaults_for(period: Period) -> Self {
        let config = TriggerConfig::defaults_for(period);
        let at = config.time().unwrap_or_default();
        Self::new(period, at, &config.button_label, config.messages)
    }

    /// Whether the trigger is due at `now`.
    pub fn should_run(&self, now: &DateTime<Local>) -> bool {
        match &self.next_run {
            Some(next) => now >= next,
            None => false,
        }
    }

    /// Recompute `next_run` relative to `now`.
    pub fn schedule_after(&mut self, now: &DateTime<Local>) {
        self.next_run = cron::next_daily_run(self.at, now);
    }

    /// Pick one candidate message uniformly at random.
    pub fn pick_message<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.messages.choose(rng).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn local(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, 15, h, m, 0).earliest().unwrap()
    }

    #[test]
    fn test_default_triggers() {
        let morning = DailyTrigger::morning();
        assert_eq!(morning.at, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(morning.button_label, "早安！");
        assert_eq!(morning.messages.len(), 3);

        let evening = DailyTrigger::evening();
        assert_eq!(evening.at, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(evening.period, Period::Evening);
    }

    #[test]
    fn test_unscheduled_trigger_never_runs() {
        let trigger = DailyTrigger::morning();
        assert!(!trigger.should_run(&local(9, 0)));
    }

    #[test]
    fn test_should_run_after_next_run() {
        let mut trigger = DailyTrigger::morning();
        trigger.schedule_after(&local(8, 0));
        assert!(!trigger.should_run(&local(8, 59)));
        assert!(trigger.should_run(&local(9, 0)));
        assert!(trigger.should_run(&local(9, 1)));
    }

    #[test]
    fn test_pick_message_is_always_a_candidate() {
        let trigger = DailyTrigger::morning();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let picked = trigger.pick_message(&mut rng).unwrap();
            assert!(trigger.messages.iter().any(|m| m == picked));
        }
    }

    #[test]
    fn test_pick_message_covers_all_candidates() {
        let trigger = DailyTrigger::evening();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(trigger.pick_message(&mut rng).unwrap().to_string());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_pick_from_empty_list() {
        let trigger = DailyTrigger::new(Period::Morning, NaiveTime::default(), "ok", vec![]);
        assert!(trigger.pick_message(&mut StdRng::seed_from_u64(1)).is_none());
    }
}
