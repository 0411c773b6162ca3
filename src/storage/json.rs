//! JSON file backed guild store.
//!
//! The whole document is held in memory and rewritten on every save. Writes
//! go to a sibling temp file first and are renamed into place, so a crash
//! mid-write never leaves a truncated store behind.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serenity::async_trait;
use serenity::model::id::GuildId;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::common::error::{StoreError, StoreResult};
use crate::reactions::model::GuildReactionConfig;
use crate::storage::GuildStore;

type Document = BTreeMap<u64, GuildReactionConfig>;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    guilds: RwLock<Document>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let guilds: Document = match tokio::fs::read_to_string(&path).await {
            Ok(data) if data.trim().is_empty() => Document::new(),
            Ok(data) => serde_json::from_str(&data)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Store file {} not found, starting empty", path.display());
                Document::new()
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        info!(
            "Loaded reaction store from {} ({} guilds)",
            path.display(),
            guilds.len()
        );

        Ok(Self {
            path,
            guilds: RwLock::new(guilds),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_document(&self, document: &Document) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        let data = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, data)
            .await
            .map_err(|e| io_error(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;

        Ok(())
    }
}

#[async_trait]
impl GuildStore for JsonFileStore {
    async fn load(&self, guild_id: GuildId) -> StoreResult<GuildReactionConfig> {
        let guilds = self.guilds.read().await;
        Ok(guilds.get(&guild_id.get()).cloned().unwrap_or_default())
    }

    async fn save(&self, guild_id: GuildId, config: &GuildReactionConfig) -> StoreResult<()> {
        // The write lock is held through the file write so saves hit the
        // disk in the same order they hit memory.
        let mut guilds = self.guilds.write().await;

        // Memory only changes once the file does.
        let mut next = guilds.clone();
        if *config == GuildReactionConfig::default() {
            next.remove(&guild_id.get());
        } else {
            next.insert(guild_id.get(), config.clone());
        }

        self.write_document(&next).await?;
        *guilds = next;
        debug!("Saved reaction config for guild {}", guild_id);
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::model::id::RoleId;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = assert_ok!(JsonFileStore::open(dir.path().join("reactions.json")).await);

        let config = assert_ok!(store.load(GuildId::new(1)).await);
        assert_eq!(config, GuildReactionConfig::default());
    }

    #[tokio::test]
    async fn test_saved_config_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reactions.json");
        let guild = GuildId::new(1234);

        let mut config = GuildReactionConfig::default();
        config.reactions.insert("🎉", "party");
        config.reactions.insert("🍕", "pizza");
        config.set_role_restriction(Some(RoleId::new(77)));

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            assert_ok!(store.save(guild, &config).await);
            assert_eq!(store.load(guild).await.unwrap(), config);
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let loaded = reopened.load(guild).await.unwrap();
        assert_eq!(loaded, config);
        let order: Vec<&str> = loaded.reactions.entries().map(|e| e.emoji.as_str()).collect();
        assert_eq!(order, vec!["🎉", "🍕"]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_saving_default_drops_guild() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reactions.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        let guild = GuildId::new(5);

        let mut config = GuildReactionConfig::default();
        config.reactions.insert("🍕", "pizza");
        store.save(guild, &config).await.unwrap();
        store.save(guild, &GuildReactionConfig::default()).await.unwrap();

        let data = std::fs::read_to_string(&path).unwrap();
        assert_eq!(data.trim(), "{}");
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reactions.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        let guild = GuildId::new(9);

        // A directory in the temp file's place makes the write fail.
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        let mut config = GuildReactionConfig::default();
        config.reactions.insert("🍕", "pizza");
        assert_err!(store.save(guild, &config).await);

        assert_eq!(store.load(guild).await.unwrap(), GuildReactionConfig::default());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reactions.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = JsonFileStore::open(&path).await;
        assert!(matches!(assert_err!(result), StoreError::Serialize(_)));
    }
}
