//! Discord bot integration.
//!
//! This module wires the reaction engine to serenity: the gateway client,
//! the event handler, moderator commands, and cache/HTTP adapters.

pub mod client;
pub mod commands;
pub mod format;
pub mod handler;
pub mod platform;

// Re-export main types for external use
pub use client::{DiscordBot, DiscordBotBuilder};
pub use platform::{CacheEmojiDirectory, HttpReactionApplier};
