//! Per-guild trigger registry.
//!
//! All mutation goes through here. Each guild has its own async lock that is
//! held across load and save, so a command and a dead-emoji sweep touching
//! the same guild cannot overwrite each other's changes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serenity::model::id::{GuildId, RoleId};
use tracing::{debug, info};

use crate::common::error::StoreResult;
use crate::reactions::emoji::EmojiToken;
use crate::reactions::model::{GuildReactionConfig, ReactionMap};
use crate::storage::GuildStore;

/// Result of adding a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

/// Result of removing a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

pub struct Registry {
    store: Arc<dyn GuildStore>,
    locks: Mutex<HashMap<GuildId, Arc<tokio::sync::Mutex<()>>>>,
}

impl Registry {
    pub fn new(store: Arc<dyn GuildStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn guild_lock(&self, guild_id: GuildId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(guild_id).or_default().clone()
    }

    /// Run a read-modify-write on a guild's config under its lock.
    /// The config is saved only when `mutate` reports a change.
    async fn update<T, F>(&self, guild_id: GuildId, mutate: F) -> StoreResult<T>
    where
        F: FnOnce(&mut GuildReactionConfig) -> (T, bool),
    {
        let lock = self.guild_lock(guild_id);
        let _guard = lock.lock().await;

        let mut config = self.store.load(guild_id).await?;
        let (result, changed) = mutate(&mut config);
        if changed {
            self.store.save(guild_id, &config).await?;
        }
        Ok(result)
    }

    pub async fn add_trigger(
        &self,
        guild_id: GuildId,
        emoji: &EmojiToken,
        word: &str,
    ) -> StoreResult<AddOutcome> {
        let emoji = emoji.to_string();
        let outcome = self
            .update(guild_id, |config| {
                if config.reactions.insert(&emoji, word) {
                    (AddOutcome::Added, true)
                } else {
                    (AddOutcome::AlreadyExists, false)
                }
            })
            .await?;

        debug!(
            "add_trigger guild={} emoji={} word={} -> {:?}",
            guild_id, emoji, word, outcome
        );
        Ok(outcome)
    }

    pub async fn remove_trigger(
        &self,
        guild_id: GuildId,
        emoji: &EmojiToken,
        word: &str,
    ) -> StoreResult<RemoveOutcome> {
        let emoji = emoji.to_string();
        let outcome = self
            .update(guild_id, |config| {
                if config.reactions.remove(&emoji, word) {
                    (RemoveOutcome::Removed, true)
                } else {
                    (RemoveOutcome::NotFound, false)
                }
            })
            .await?;

        debug!(
            "remove_trigger guild={} emoji={} word={} -> {:?}",
            guild_id, emoji, word, outcome
        );
        Ok(outcome)
    }

    /// `(emoji, word)` pairs grouped by emoji, in registry order.
    pub async fn list_triggers(&self, guild_id: GuildId) -> StoreResult<Vec<(String, String)>> {
        Ok(self.reactions(guild_id).await?.pairs())
    }

    /// Snapshot of a guild's reaction map.
    pub async fn reactions(&self, guild_id: GuildId) -> StoreResult<ReactionMap> {
        Ok(self.store.load(guild_id).await?.reactions)
    }

    pub async fn set_role_restriction(
        &self,
        guild_id: GuildId,
        role: Option<RoleId>,
    ) -> StoreResult<()> {
        self.update(guild_id, |config| {
            config.set_role_restriction(role);
            ((), true)
        })
        .await?;

        info!("Role restriction for guild {} set to {:?}", guild_id, role);
        Ok(())
    }

    pub async fn role_restriction(&self, guild_id: GuildId) -> StoreResult<Option<RoleId>> {
        Ok(self.store.load(guild_id).await?.role_restriction())
    }

    /// Remove an emoji's whole entry. Returns false if it was not present.
    pub async fn purge_emoji(&self, guild_id: GuildId, emoji: &str) -> StoreResult<bool> {
        let removed = self
            .update(guild_id, |config| {
                let removed = !config.reactions.retain_emojis(|stored| stored != emoji).is_empty();
                (removed, removed)
            })
            .await?;

        if removed {
            info!("Purged emoji {} from guild {}", emoji, guild_id);
        }
        Ok(removed)
    }

    /// Remove every emoji entry for which `is_alive` returns false, in one
    /// locked pass. Returns the removed tokens.
    pub async fn purge_dead<F>(&self, guild_id: GuildId, is_alive: F) -> StoreResult<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let removed = self
            .update(guild_id, |config| {
                let removed = config.reactions.retain_emojis(is_alive);
                let changed = !removed.is_empty();
                (removed, changed)
            })
            .await?;

        if !removed.is_empty() {
            info!(
                "Purged {} dead emoji entries from guild {}: {:?}",
                removed.len(),
                guild_id,
                removed
            );
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn guild() -> GuildId {
        GuildId::new(100)
    }

    fn pizza() -> EmojiToken {
        EmojiToken::Literal("🍕".to_string())
    }

    fn registry() -> (Registry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Registry::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let (registry, store) = registry();

        assert_eq!(registry.add_trigger(guild(), &pizza(), "pizza").await.unwrap(), AddOutcome::Added);
        assert_eq!(
            registry.add_trigger(guild(), &pizza(), "Pizza").await.unwrap(),
            AddOutcome::AlreadyExists
        );

        let pairs = registry.list_triggers(guild()).await.unwrap();
        assert_eq!(pairs, vec![("🍕".to_string(), "pizza".to_string())]);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_last_word_removes_emoji() {
        let (registry, _) = registry();
        registry.add_trigger(guild(), &pizza(), "pizza").await.unwrap();

        assert_eq!(
            registry.remove_trigger(guild(), &pizza(), "PIZZA").await.unwrap(),
            RemoveOutcome::Removed
        );
        assert!(registry.list_triggers(guild()).await.unwrap().is_empty());
        assert!(registry.reactions(guild()).await.unwrap().get("🍕").is_none());
        assert_eq!(
            registry.remove_trigger(guild(), &pizza(), "pizza").await.unwrap(),
            RemoveOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_guilds_are_independent() {
        let (registry, _) = registry();
        let other = GuildId::new(200);

        registry.add_trigger(guild(), &pizza(), "pizza").await.unwrap();
        assert!(registry.list_triggers(other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_role_restriction_round_trip() {
        let (registry, _) = registry();
        assert_eq!(registry.role_restriction(guild()).await.unwrap(), None);

        registry.set_role_restriction(guild(), Some(RoleId::new(9))).await.unwrap();
        assert_eq!(registry.role_restriction(guild()).await.unwrap(), Some(RoleId::new(9)));

        registry.set_role_restriction(guild(), None).await.unwrap();
        assert_eq!(registry.role_restriction(guild()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_purge_emoji() {
        let (registry, _) = registry();
        registry.add_trigger(guild(), &pizza(), "pizza").await.unwrap();
        registry.add_trigger(guild(), &pizza(), "slice").await.unwrap();

        assert!(registry.purge_emoji(guild(), "🍕").await.unwrap());
        assert!(!registry.purge_emoji(guild(), "🍕").await.unwrap());
        assert!(registry.list_triggers(guild()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_dead_without_removals_does_not_save() {
        let (registry, store) = registry();
        registry.add_trigger(guild(), &pizza(), "pizza").await.unwrap();
        let saves = store.save_count();

        let removed = registry.purge_dead(guild(), |_| true).await.unwrap();
        assert!(removed.is_empty());
        assert_eq!(store.save_count(), saves);
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let (registry, _) = registry();
        let registry = Arc::new(registry);

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    registry
                        .add_trigger(guild(), &pizza(), &format!("word{}", i))
                        .await
                        .unwrap()
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), AddOutcome::Added);
        }

        assert_eq!(registry.list_triggers(guild()).await.unwrap().len(), 32);
    }
}
