//! Per-guild persistent configuration.
//!
//! The store only knows how to load and save a whole
//! [`GuildReactionConfig`]; serialization of concurrent updates is the
//! registry's job.

pub mod json;
pub mod memory;

use serenity::async_trait;
use serenity::model::id::GuildId;

use crate::common::error::StoreResult;
use crate::reactions::model::GuildReactionConfig;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

/// Keyed configuration store with read-your-writes semantics.
#[async_trait]
pub trait GuildStore: Send + Sync {
    /// Load a guild's configuration, defaulting every field that was never set.
    async fn load(&self, guild_id: GuildId) -> StoreResult<GuildReactionConfig>;

    /// Persist a guild's configuration before returning.
    async fn save(&self, guild_id: GuildId, config: &GuildReactionConfig) -> StoreResult<()>;
}
