//! Configuration type definitions.

use serde::Deserialize;
use serenity::model::id::GuildId;

pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_STORAGE_PATH: &str = "data/reactions.json";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub reactions: ReactionsConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    /// Command prefix, e.g. "!" for `!addreact`.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

/// Where guild reaction settings are persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON store path. Empty keeps everything in memory.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl StorageConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path.trim().is_empty()
    }
}

/// Automatic reaction settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReactionsConfig {
    /// Guilds where automatic reactions are switched off.
    #[serde(default)]
    pub disabled_guilds: Vec<u64>,
}

impl ReactionsConfig {
    pub fn disabled_guild_ids(&self) -> Vec<GuildId> {
        self.disabled_guilds
            .iter()
            .filter(|id| **id != 0)
            .map(|id| GuildId::new(*id))
            .collect()
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_storage_path() -> String {
    DEFAULT_STORAGE_PATH.to_string()
}
