//! Check-in handler — turns a button click into a ledger entry.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use rollcall_core::types::{CheckinRecord, Period};

use crate::state::BotState;

/// Handles clicks on any check-in button, live or stale.
///
/// The period comes from the button's control id, so buttons on earlier
/// prompts keep recording the period they were posted for.
#[derive(Clone)]
pub struct CheckinHandler {
    state: Arc<BotState>,
}

impl CheckinHandler {
    pub fn new(state: Arc<BotState>) -> Self {
        Self { state }
    }

    /// Record a click now. Returns the private reply, or `None` when the
    /// control is not a check-in button.
    ///
    /// The ledger write runs on the blocking pool.
    pub async fn handle(&self, actor: &str, control_id: &str) -> Option<String> {
        let period = Period::from_control_id(control_id)?;
        let handler = self.clone();
        let actor = actor.to_string();
        let control_id = control_id.to_string();
        let now = self.state.now();

        let task = tokio::task::spawn_blocking(move || handler.handle_at(&actor, &control_id, now));
        match task.await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("❌ Check-in task failed: {e}");
                Some(failure_reply(period))
            }
        }
    }

    /// Record a click at `now`.
    ///
    /// Repeated clicks by the same actor each produce a record.
    pub fn handle_at(
        &self,
        actor: &str,
        control_id: &str,
        now: DateTime<FixedOffset>,
    ) -> Option<String> {
        let period = Period::from_control_id(control_id)?;
        let record = CheckinRecord::new(actor, now, period);
        let timestamp = record.timestamp();

        match self.state.ledger.append(record) {
            Ok(()) => {
                tracing::info!("✅ {actor} checked in ({period}) at {timestamp}");
                Some(format!("{}簽到成功！", period.label()))
            }
            Err(e) => {
                tracing::error!("❌ Failed to persist check-in for {actor}: {e}");
                Some(failure_reply(period))
            }
        }
    }
}

fn failure_reply(period: Period) -> String {
    format!("{}簽到失敗，請稍後再試。", period.label())
}
