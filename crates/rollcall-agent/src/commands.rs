//! Admin commands: `!手動`, `!查看簽到`, `!導出簽到`.

use std::path::PathBuf;

use rollcall_core::config::TriggerConfig;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::types::Period;

use crate::dispatcher::PromptDispatcher;

/// Operator commands, all administrator-gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// `手動` — post a manual prompt now.
    ManualTrigger,
    /// `查看簽到` — list in-memory records.
    ViewRecords,
    /// `導出簽到` — export records to CSV and attach it.
    ExportRecords,
}

impl AdminCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ManualTrigger => "手動",
            Self::ViewRecords => "查看簽到",
            Self::ExportRecords => "導出簽到",
        }
    }

    /// Parse a chat message. Extra words after the command are ignored.
    pub fn parse(content: &str, prefix: &str) -> Option<Self> {
        let name = content.trim().strip_prefix(prefix)?.split_whitespace().next()?;
        [Self::ManualTrigger, Self::ViewRecords, Self::ExportRecords]
            .into_iter()
            .find(|c| c.name() == name)
    }
}

/// Who sent the command.
#[derive(Debug, Clone)]
pub struct Invoker {
    pub name: String,
    /// Holds the guild Administrator permission.
    pub is_admin: bool,
}

/// What to send back to the invoking channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Text(String),
    File { content: String, path: PathBuf },
}

/// Executes admin commands against the shared state.
#[derive(Clone)]
pub struct CommandRouter {
    dispatcher: PromptDispatcher,
}

impl CommandRouter {
    pub fn new(dispatcher: PromptDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run `command` for `invoker`. Non-administrators get
    /// `PermissionDenied` and the command body never runs.
    pub async fn execute(&self, command: AdminCommand, invoker: &Invoker) -> Result<CommandReply> {
        if !invoker.is_admin {
            tracing::warn!("🚫 {} tried !{} without administrator", invoker.name, command.name());
            return Err(RollcallError::PermissionDenied(format!(
                "{} requires administrator",
                command.name()
            )));
        }
        tracing::info!("🛠️ {} ran !{}", invoker.name, command.name());

        match command {
            AdminCommand::ManualTrigger => self.manual_trigger().await,
            AdminCommand::ViewRecords => Ok(self.view_records()),
            AdminCommand::ExportRecords => self.export_records(),
        }
    }

    async fn manual_trigger(&self) -> Result<CommandReply> {
        let defaults = TriggerConfig::defaults_for(Period::Manual);
        let message = defaults.messages.first().map(String::as_str).unwrap_or_default();
        let reply = match self
            .dispatcher
            .dispatch(message, Period::Manual, &defaults.button_label)
            .await
        {
            Ok(_) => "手動消息已發送",
            Err(e) => {
                tracing::error!("❌ Manual prompt failed: {e}");
                "手動消息發送失敗，請查看日誌。"
            }
        };
        Ok(CommandReply::Text(reply.to_string()))
    }

    fn view_records(&self) -> CommandReply {
        let mut response = String::from("今日簽到紀錄:\n");
        for record in self.dispatcher.state().ledger.snapshot() {
            response.push_str(&record.display_line());
            response.push('\n');
        }
        CommandReply::Text(response)
    }

    fn export_records(&self) -> Result<CommandReply> {
        let path = self.dispatcher.state().ledger.export()?;
        Ok(CommandReply::File {
            content: "簽到紀錄已導出為 CSV 文件。".to_string(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::CheckinHandler;
    use crate::testing::{FakeChannel, test_state};
    use chrono::{FixedOffset, TimeZone};
    use std::sync::Arc;

    fn admin() -> Invoker {
        Invoker { name: "op".into(), is_admin: true }
    }

    fn member() -> Invoker {
        Invoker { name: "guest".into(), is_admin: false }
    }

    fn setup(channel: FakeChannel) -> (tempfile::TempDir, CommandRouter, CheckinHandler, Arc<FakeChannel>) {
        let (dir, state) = test_state();
        let state = Arc::new(state);
        let channel = Arc::new(channel);
        let dispatcher = PromptDispatcher::new(state.clone(), channel.clone());
        (dir, CommandRouter::new(dispatcher), CheckinHandler::new(state), channel)
    }

    fn click(handler: &CheckinHandler, actor: &str, sec: u32) {
        let at = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 9, 0, sec)
            .unwrap();
        handler.handle_at(actor, "rollcall:checkin:morning", at);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(AdminCommand::parse("!手動", "!"), Some(AdminCommand::ManualTrigger));
        assert_eq!(AdminCommand::parse("  !查看簽到 ", "!"), Some(AdminCommand::ViewRecords));
        assert_eq!(AdminCommand::parse("!導出簽到 now", "!"), Some(AdminCommand::ExportRecords));
        assert_eq!(AdminCommand::parse("手動", "!"), None);
        assert_eq!(AdminCommand::parse("!help", "!"), None);
        assert_eq!(AdminCommand::parse("!", "!"), None);
    }

    #[tokio::test]
    async fn test_non_admin_is_denied_before_body_runs() {
        let (_dir, router, handler, channel) = setup(FakeChannel::default());
        click(&handler, "alice", 1);

        for command in [
            AdminCommand::ManualTrigger,
            AdminCommand::ViewRecords,
            AdminCommand::ExportRecords,
        ] {
            let result = router.execute(command, &member()).await;
            assert!(matches!(result, Err(RollcallError::PermissionDenied(_))));
        }
        assert!(channel.posted().is_empty());
        assert_eq!(channel.purges(), 0);
        assert!(!router.dispatcher.state().ledger.export_path().exists());
    }

    #[tokio::test]
    async fn test_view_with_no_records_is_header_only() {
        let (_dir, router, _handler, _channel) = setup(FakeChannel::default());
        let reply = router.execute(AdminCommand::ViewRecords, &admin()).await.unwrap();
        assert_eq!(reply, CommandReply::Text("今日簽到紀錄:\n".into()));
    }

    #[tokio::test]
    async fn test_view_lists_every_record() {
        let (_dir, router, handler, _channel) = setup(FakeChannel::default());
        click(&handler, "alice", 1);
        click(&handler, "alice", 5);

        let reply = router.execute(AdminCommand::ViewRecords, &admin()).await.unwrap();
        assert_eq!(
            reply,
            CommandReply::Text(
                "今日簽到紀錄:\n\
                 alice (早上): 2024-01-01 09:00:01\n\
                 alice (早上): 2024-01-01 09:00:05\n"
                    .into()
            )
        );
    }

    #[tokio::test]
    async fn test_export_overwrites_file() {
        let (_dir, router, handler, _channel) = setup(FakeChannel::default());

        click(&handler, "alice", 1);
        router.execute(AdminCommand::ExportRecords, &admin()).await.unwrap();

        click(&handler, "bob", 2);
        click(&handler, "carol", 3);
        let reply = router.execute(AdminCommand::ExportRecords, &admin()).await.unwrap();

        let CommandReply::File { content, path } = reply else {
            panic!("expected a file reply");
        };
        assert_eq!(content, "簽到紀錄已導出為 CSV 文件。");
        assert!(path.ends_with("checkins.csv"));
        let csv = std::fs::read_to_string(&path).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.starts_with("使用者,簽到時間,時段\n"));
    }

    #[tokio::test]
    async fn test_manual_trigger_posts_manual_prompt() {
        let (_dir, router, _handler, channel) = setup(FakeChannel::default());

        let reply = router.execute(AdminCommand::ManualTrigger, &admin()).await.unwrap();
        assert_eq!(reply, CommandReply::Text("手動消息已發送".into()));

        let posted = channel.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].1.content, "這是一條手動觸發的消息。\n請點擊按鈕簽到！");
        assert_eq!(posted[0].1.button_label, "回覆");
        let live = router.dispatcher.state().current_prompt().unwrap();
        assert_eq!(live.period, Period::Manual);
    }

    #[tokio::test]
    async fn test_manual_trigger_reports_failure() {
        let (_dir, router, _handler, _channel) = setup(FakeChannel {
            unresolvable: true,
            ..Default::default()
        });
        let reply = router.execute(AdminCommand::ManualTrigger, &admin()).await.unwrap();
        assert_eq!(reply, CommandReply::Text("手動消息發送失敗，請查看日誌。".into()));
    }
}
