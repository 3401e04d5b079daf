//! Rollcall configuration system.
//!
//! Layering: built-in defaults → optional TOML file → environment variables.

use chrono::{FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, RollcallError};
use crate::types::Period;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollcallConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

fn default_log_level() -> String { "info".into() }
fn bool_true() -> bool { true }

impl Default for RollcallConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            discord: DiscordConfig::default(),
            schedule: ScheduleConfig::default(),
            ledger: LedgerConfig::default(),
            shutdown: ShutdownConfig::default(),
        }
    }
}

impl RollcallConfig {
    /// Load config from the default path (~/.rollcall/config.toml), or defaults.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RollcallError::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content)
            .map_err(|e| RollcallError::Config(format!("Failed to parse config: {e}")))
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rollcall")
            .join("config.toml")
    }

    /// Overlay `DISCORD_TOKEN`, `CHANNEL_ID` and `LOG_LEVEL` from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay environment values read through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.discord.token = token.trim().to_string();
        }
        if let Some(raw) = lookup("CHANNEL_ID").filter(|c| !c.trim().is_empty()) {
            self.discord.channel_id = raw.trim().parse().map_err(|_| {
                RollcallError::Config(format!("CHANNEL_ID must be numeric, got '{raw}'"))
            })?;
        }
        if let Some(level) = lookup("LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            self.log_level = level.trim().to_lowercase();
        }
        Ok(())
    }

    /// Reject configurations the bot cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.discord.token.is_empty() {
            return Err(RollcallError::Config(
                "DISCORD_TOKEN is required (env or [discord].token)".into(),
            ));
        }
        if self.discord.channel_id == 0 {
            return Err(RollcallError::Config(
                "CHANNEL_ID is required (env or [discord].channel_id)".into(),
            ));
        }
        if self.discord.purge_limit > 100 {
            return Err(RollcallError::Config(format!(
                "purge_limit {} exceeds the platform batch limit of 100",
                self.discord.purge_limit
            )));
        }
        self.schedule.trigger(Period::Morning).time()?;
        self.schedule.trigger(Period::Evening).time()?;
        self.ledger.offset()?;
        Ok(())
    }
}

/// Discord connection and channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default, skip_serializing)]
    pub token: String,
    #[serde(default)]
    pub channel_id: u64,
    #[serde(default = "default_purge_limit")]
    pub purge_limit: u8,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

fn default_purge_limit() -> u8 { 100 }
fn default_command_prefix() -> String { "!".into() }

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel_id: 0,
            purge_limit: default_purge_limit(),
            command_prefix: default_command_prefix(),
        }
    }
}

/// Daily prompt schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub morning: TriggerConfig,
    #[serde(default)]
    pub evening: TriggerConfig,
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

fn default_tick_secs() -> u64 { 1 }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            morning: TriggerConfig::default(),
            evening: TriggerConfig::default(),
            tick_secs: default_tick_secs(),
        }
    }
}

impl ScheduleConfig {
    /// Settings for one period with unset fields filled from that period's defaults.
    pub fn trigger(&self, period: Period) -> TriggerConfig {
        let configured = match period {
            Period::Morning => self.morning.clone(),
            Period::Evening => self.evening.clone(),
            Period::Manual => TriggerConfig::default(),
        };
        configured.or_defaults(&TriggerConfig::defaults_for(period))
    }
}

/// One recurring prompt. Empty fields fall back to the period defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TriggerConfig {
    /// Local wall-clock time, `HH:MM`.
    #[serde(default)]
    pub at: String,
    #[serde(default)]
    pub button_label: String,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl TriggerConfig {
    /// Built-in settings for a period.
    pub fn defaults_for(period: Period) -> Self {
        match period {
            Period::Morning => Self {
                at: "09:00".into(),
                button_label: "早安！".into(),
                messages: vec![
                    "早安～新的一天開始了，祝你有個美好的一天 :smiley:".into(),
                    "大家早安 :sunny: 希望你今天充滿活力和笑容！".into(),
                    "早安～願你今天順利又愉快 :smiling_face_with_3_hearts: ".into(),
                ],
            },
            Period::Evening => Self {
                at: "18:00".into(),
                button_label: "休息囉！".into(),
                messages: vec![
                    "晚安～今天辛苦了，記得放鬆一下 :beers: ".into(),
                    "結束了一天的忙碌，請好好休息 :sleeping: ".into(),
                    "晚安～享受一下輕鬆的時光吧 :partying_face: ".into(),
                ],
            },
            Period::Manual => Self {
                at: String::new(),
                button_label: "回覆".into(),
                messages: vec!["這是一條手動觸發的消息。".into()],
            },
        }
    }

    fn or_defaults(mut self, defaults: &TriggerConfig) -> Self {
        if self.at.trim().is_empty() {
            self.at = defaults.at.clone();
        }
        if self.button_label.is_empty() {
            self.button_label = defaults.button_label.clone();
        }
        if self.messages.is_empty() {
            self.messages = defaults.messages.clone();
        }
        self
    }

    /// Parse `at` as a wall-clock time.
    pub fn time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.at.trim(), "%H:%M")
            .map_err(|e| RollcallError::Config(format!("Invalid time '{}': {e}", self.at)))
    }
}

/// Where and how check-ins are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_records_dir")]
    pub records_dir: String,
    /// Ledger timezone offset. Asia/Taipei has no DST, so a fixed offset is exact.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

fn default_records_dir() -> String { "checkin_records".into() }
fn default_utc_offset_hours() -> i32 { 8 }

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            records_dir: default_records_dir(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl LedgerConfig {
    /// Records directory with `~` expanded.
    pub fn records_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.records_dir).to_string())
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            RollcallError::Config(format!(
                "utc_offset_hours out of range: {}",
                self.utc_offset_hours
            ))
        })
    }
}

/// Shutdown routine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    #[serde(default = "bool_true")]
    pub purge_on_exit: bool,
    #[serde(default = "default_shutdown_timeout")]
    pub timeout_secs: u64,
}

fn default_shutdown_timeout() -> u64 { 10 }

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            purge_on_exit: true,
            timeout_secs: default_shutdown_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RollcallConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.discord.purge_limit, 100);
        assert_eq!(config.discord.command_prefix, "!");
        assert_eq!(config.ledger.records_dir, "checkin_records");
        assert_eq!(config.ledger.utc_offset_hours, 8);
        assert!(config.shutdown.purge_on_exit);
    }

    #[test]
    fn test_default_triggers() {
        let schedule = ScheduleConfig::default();
        let morning = schedule.trigger(Period::Morning);
        assert_eq!(morning.time().unwrap(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(morning.button_label, "早安！");
        assert_eq!(morning.messages.len(), 3);

        let evening = schedule.trigger(Period::Evening);
        assert_eq!(evening.time().unwrap(), NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(evening.button_label, "休息囉！");
        assert_eq!(evening.messages.len(), 3);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            log_level = "debug"

            [discord]
            channel_id = 42
            purge_limit = 50

            [schedule.morning]
            at = "07:30"
        "#;

        let config: RollcallConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.discord.channel_id, 42);
        assert_eq!(config.discord.purge_limit, 50);
        let morning = config.schedule.trigger(Period::Morning);
        assert_eq!(morning.time().unwrap(), NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        // Unset fields keep the morning defaults.
        assert_eq!(morning.button_label, "早安！");
        assert_eq!(morning.messages.len(), 3);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: RollcallConfig = toml::from_str("").unwrap();
        assert_eq!(config.schedule.tick_secs, 1);
        assert_eq!(config.shutdown.timeout_secs, 10);
    }

    #[test]
    fn test_env_overlay() {
        let mut config = RollcallConfig::default();
        config
            .apply_env_from(env(&[
                ("DISCORD_TOKEN", " secret "),
                ("CHANNEL_ID", "123456789012345678"),
                ("LOG_LEVEL", "DEBUG"),
            ]))
            .unwrap();
        assert_eq!(config.discord.token, "secret");
        assert_eq!(config.discord.channel_id, 123456789012345678);
        assert_eq!(config.log_level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_numeric_channel_id_is_config_error() {
        let mut config = RollcallConfig::default();
        let err = config
            .apply_env_from(env(&[("CHANNEL_ID", "general")]))
            .unwrap_err();
        assert!(matches!(err, RollcallError::Config(_)));
    }

    #[test]
    fn test_validate_requires_token_and_channel() {
        let mut config = RollcallConfig::default();
        assert!(config.validate().unwrap_err().is_fatal());

        config.discord.token = "secret".into();
        assert!(config.validate().unwrap_err().to_string().contains("CHANNEL_ID"));

        config.discord.channel_id = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_time() {
        let mut config = RollcallConfig::default();
        config.discord.token = "secret".into();
        config.discord.channel_id = 1;
        config.schedule.evening.at = "25:99".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_is_not_serialized() {
        let mut config = RollcallConfig::default();
        config.discord.token = "secret".into();
        let out = toml::to_string(&config).unwrap();
        assert!(!out.contains("secret"));
    }

    #[test]
    fn test_home_dir_path() {
        let path = RollcallConfig::default_path();
        assert!(path.to_string_lossy().contains(".rollcall"));
    }
}
