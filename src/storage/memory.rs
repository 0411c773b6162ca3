//! In-process guild store, used by tests and `storage.path = ""` dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use serenity::async_trait;
use serenity::model::id::GuildId;
use tokio::sync::RwLock;

use crate::common::error::StoreResult;
use crate::reactions::model::GuildReactionConfig;
use crate::storage::GuildStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    guilds: RwLock<HashMap<GuildId, GuildReactionConfig>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuildStore for MemoryStore {
    async fn load(&self, guild_id: GuildId) -> StoreResult<GuildReactionConfig> {
        Ok(self
            .guilds
            .read()
            .await
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, guild_id: GuildId, config: &GuildReactionConfig) -> StoreResult<()> {
        self.guilds.write().await.insert(guild_id, config.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
