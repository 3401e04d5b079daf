//! Check-in data model — periods, ledger records and the live prompt.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::fmt;

/// Prefix of every check-in button's custom id.
pub const CHECKIN_CONTROL_PREFIX: &str = "rollcall:checkin:";

/// Timestamp format written to the ledger and shown in chat.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which check-in opportunity a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Morning,
    Evening,
    Manual,
}

impl Period {
    /// Stable code written to CSV files.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
            Self::Manual => "manual",
        }
    }

    /// Localized label used in chat replies.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "早上",
            Self::Evening => "晚上",
            Self::Manual => "手動",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "morning" => Some(Self::Morning),
            "evening" => Some(Self::Evening),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }

    /// Custom id of the button posted for this period.
    pub fn control_id(&self) -> String {
        format!("{CHECKIN_CONTROL_PREFIX}{}", self.code())
    }

    /// Decode a button custom id; `None` for controls that are not check-in buttons.
    pub fn from_control_id(control_id: &str) -> Option<Self> {
        control_id
            .strip_prefix(CHECKIN_CONTROL_PREFIX)
            .and_then(Self::from_code)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One check-in. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinRecord {
    /// Platform user name of the clicking user.
    pub actor: String,
    /// Wall-clock instant in the ledger timezone.
    pub checked_in_at: DateTime<FixedOffset>,
    pub period: Period,
}

impl CheckinRecord {
    pub fn new(actor: &str, checked_in_at: DateTime<FixedOffset>, period: Period) -> Self {
        Self {
            actor: actor.to_string(),
            checked_in_at,
            period,
        }
    }

    /// Formatted local timestamp, e.g. `2024-01-01 09:00:01`.
    pub fn timestamp(&self) -> String {
        self.checked_in_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Calendar day that owns this record's ledger file.
    pub fn day(&self) -> NaiveDate {
        self.checked_in_at.date_naive()
    }

    /// CSV row: actor, timestamp, period.
    pub fn to_row(&self) -> [String; 3] {
        [
            self.actor.clone(),
            self.timestamp(),
            self.period.code().to_string(),
        ]
    }

    /// Listing line used by the view command.
    pub fn display_line(&self) -> String {
        format!("{} ({}): {}", self.actor, self.period.label(), self.timestamp())
    }
}

/// A prompt ready to be posted: message text plus a single button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingPrompt {
    pub content: String,
    pub button_label: String,
    pub control_id: String,
}

impl OutgoingPrompt {
    pub fn new(message: &str, period: Period, button_label: &str) -> Self {
        Self {
            content: format!("{message}\n請點擊按鈕簽到！"),
            button_label: button_label.to_string(),
            control_id: period.control_id(),
        }
    }
}

/// The currently live prompt. Replaced wholesale on every dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptState {
    pub channel_id: u64,
    pub message_id: u64,
    pub control_id: String,
    pub period: Period,
    pub posted_at: DateTime<Utc>,
}
