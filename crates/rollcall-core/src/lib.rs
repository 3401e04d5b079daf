//! # Rollcall Core
//!
//! Shared building blocks for the Rollcall check-in bot: configuration,
//! the error type, check-in data model and the chat channel trait.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::RollcallConfig;
pub use error::{Result, RollcallError};
pub use traits::ChatChannel;
pub use types::{CheckinRecord, OutgoingPrompt, Period, PromptState};
