//! In-memory channel and state fixtures for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::FixedOffset;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::traits::ChatChannel;
use rollcall_core::types::OutgoingPrompt;
use rollcall_ledger::Ledger;
use tempfile::TempDir;

use crate::state::{BotSettings, BotState};

pub const TEST_CHANNEL: u64 = 4242;

pub fn test_state() -> (TempDir, BotState) {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::open(&dir.path().join("checkin_records")).unwrap();
    let settings = BotSettings {
        channel_id: TEST_CHANNEL,
        purge_limit: 100,
        offset: FixedOffset::east_opt(8 * 3600).unwrap(),
    };
    (dir, BotState::new(settings, ledger))
}

/// Records every call; failure modes are switched on per test.
#[derive(Default)]
pub struct FakeChannel {
    pub unresolvable: bool,
    pub fail_purge: bool,
    pub fail_send: bool,
    pub purge_delay: Option<Duration>,
    pub posted: Mutex<Vec<(u64, OutgoingPrompt)>>,
    pub purge_calls: AtomicUsize,
    pub next_id: AtomicU64,
}

impl FakeChannel {
    pub fn posted(&self) -> Vec<(u64, OutgoingPrompt)> {
        self.posted.lock().unwrap().clone()
    }

    pub fn purges(&self) -> usize {
        self.purge_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatChannel for FakeChannel {
    fn name(&self) -> &str {
        "fake"
    }

    async fn resolve(&self, channel_id: u64) -> Result<bool> {
        Ok(!self.unresolvable && channel_id == TEST_CHANNEL)
    }

    async fn purge_recent(&self, _channel_id: u64, limit: u8) -> Result<usize> {
        self.purge_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.purge_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_purge {
            return Err(RollcallError::Channel("Missing Permissions".into()));
        }
        Ok(self.posted.lock().unwrap().len().min(limit as usize))
    }

    async fn send_prompt(&self, channel_id: u64, prompt: &OutgoingPrompt) -> Result<u64> {
        if self.fail_send {
            return Err(RollcallError::Channel("send failed".into()));
        }
        self.posted.lock().unwrap().push((channel_id, prompt.clone()));
        Ok(1000 + self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}
