//! # Rollcall Agent
//!
//! The bot's behavior, independent of the chat platform:
//!
//! ```text
//! Scheduler ──▶ PromptDispatcher ──▶ ChatChannel (purge + post prompt)
//!                                          │
//!               user clicks button ◀───────┘
//!                     │
//!                     ▼
//!               CheckinHandler ──▶ Ledger (memory + day file)
//!
//! !手動 / !查看簽到 / !導出簽到 ──▶ CommandRouter (admin only)
//! ```

pub mod checkin;
pub mod commands;
pub mod dispatcher;
pub mod shutdown;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use checkin::CheckinHandler;
pub use commands::{AdminCommand, CommandReply, CommandRouter, Invoker};
pub use dispatcher::PromptDispatcher;
pub use shutdown::shutdown_purge;
pub use state::{BotSettings, BotState};
