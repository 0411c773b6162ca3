//! Configuration file parsing (HOCON format).

use std::path::Path;

use crate::common::error::ConfigError;
use crate::config::types::Config;
use hocon::HoconLoader;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a HOCON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{DEFAULT_PREFIX, DEFAULT_STORAGE_PATH};

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load_config_str(r#"discord { token = "abc" }"#).unwrap();

        assert_eq!(config.discord.token, "abc");
        assert_eq!(config.discord.prefix, DEFAULT_PREFIX);
        assert_eq!(config.storage.path, DEFAULT_STORAGE_PATH);
        assert!(config.reactions.disabled_guilds.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = load_config_str(
            r#"
            discord {
                token = "abc"
                prefix = "?"
            }
            storage {
                path = "/var/lib/selective-react/reactions.json"
            }
            reactions {
                disabled_guilds = [ 111, 222 ]
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.discord.prefix, "?");
        assert_eq!(config.storage.path, "/var/lib/selective-react/reactions.json");
        assert_eq!(config.reactions.disabled_guild_ids().len(), 2);
    }

    #[test]
    fn test_missing_token_is_parse_error() {
        let result = load_config_str(r#"discord { prefix = "!" }"#);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config("/definitely/not/here/selective-react.conf");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
