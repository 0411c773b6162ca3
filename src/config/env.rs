//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `SELECTIVE_REACT_DISCORD_TOKEN` - Discord bot token
//! - `SELECTIVE_REACT_COMMAND_PREFIX` - Command prefix
//! - `SELECTIVE_REACT_STORAGE_PATH` - Reaction store path

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "SELECTIVE_REACT";

/// Apply environment variable overrides to a config.
///
/// Lets the token live outside the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        config.discord.token = token;
    }
    if let Ok(prefix) = env::var(format!("{}_COMMAND_PREFIX", ENV_PREFIX)) {
        config.discord.prefix = prefix;
    }
    if let Ok(path) = env::var(format!("{}_STORAGE_PATH", ENV_PREFIX)) {
        config.storage.path = path;
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `SELECTIVE_REACT_CONFIG`, otherwise returns "selective-react.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX))
        .unwrap_or_else(|_| "selective-react.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn make_test_config() -> Config {
        Config {
            discord: DiscordConfig {
                token: "file_token".to_string(),
                prefix: "!".to_string(),
            },
            storage: StorageConfig::default(),
            reactions: ReactionsConfig::default(),
        }
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "SELECTIVE_REACT");
    }

    #[test]
    fn test_get_config_path_default() {
        env::remove_var("SELECTIVE_REACT_CONFIG");
        assert_eq!(get_config_path(), "selective-react.conf");
    }

    #[test]
    fn test_apply_env_overrides_no_vars() {
        env::remove_var("SELECTIVE_REACT_DISCORD_TOKEN");
        env::remove_var("SELECTIVE_REACT_COMMAND_PREFIX");
        env::remove_var("SELECTIVE_REACT_STORAGE_PATH");

        let result = apply_env_overrides(make_test_config());

        assert_eq!(result.discord.token, "file_token");
        assert_eq!(result.discord.prefix, "!");
        assert_eq!(result.storage.path, DEFAULT_STORAGE_PATH);
    }
}
