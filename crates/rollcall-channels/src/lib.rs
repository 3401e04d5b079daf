//! # Rollcall Channels
//! Chat platform implementations of [`rollcall_core::ChatChannel`].

pub mod discord;

pub use discord::{DiscordChannel, is_guild_admin};
