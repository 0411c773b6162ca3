//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

const MAX_PREFIX_LEN: usize = 5;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.discord.token.is_empty() {
        errors.push("discord.token is required".to_string());
    }
    if config.discord.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("discord.token has not been configured (still using placeholder)".to_string());
    }

    let prefix = &config.discord.prefix;
    if prefix.trim().is_empty() {
        errors.push("discord.prefix must not be empty".to_string());
    } else if prefix.chars().any(char::is_whitespace) {
        errors.push("discord.prefix must not contain whitespace".to_string());
    }
    if prefix.chars().count() > MAX_PREFIX_LEN {
        errors.push(format!(
            "discord.prefix must be at most {} characters (got {})",
            MAX_PREFIX_LEN,
            prefix.chars().count()
        ));
    }

    if config.reactions.disabled_guilds.contains(&0) {
        errors.push("reactions.disabled_guilds must not contain 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn make_valid_config() -> Config {
        Config {
            discord: DiscordConfig {
                token: "valid_token_here".to_string(),
                prefix: "!".to_string(),
            },
            storage: StorageConfig::default(),
            reactions: ReactionsConfig {
                disabled_guilds: vec![123456789],
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&make_valid_config()).is_ok());
    }

    #[test]
    fn test_empty_token_fails() {
        let mut config = make_valid_config();
        config.discord.token = String::new();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("discord.token"));
    }

    #[test]
    fn test_placeholder_token_fails() {
        let mut config = make_valid_config();
        config.discord.token = "YOUR_DISCORD_TOKEN_HERE".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("placeholder"));
    }

    #[test]
    fn test_bad_prefixes_fail() {
        for prefix in ["", " ", "! ", "toolong"] {
            let mut config = make_valid_config();
            config.discord.prefix = prefix.to_string();
            assert!(
                validate_config(&config).is_err(),
                "prefix {:?} should be rejected",
                prefix
            );
        }
    }

    #[test]
    fn test_errors_are_collected() {
        let mut config = make_valid_config();
        config.discord.token = String::new();
        config.discord.prefix = String::new();
        config.reactions.disabled_guilds = vec![0];

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("discord.token"));
        assert!(message.contains("discord.prefix"));
        assert!(message.contains("disabled_guilds"));
    }
}
