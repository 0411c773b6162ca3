//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Persistence errors from the guild store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access store file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize store data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors produced while parsing a stored or user-supplied emoji token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmojiParseError {
    #[error("Emoji token is empty")]
    Empty,

    #[error("Malformed custom emoji token: {token}")]
    MalformedCustom { token: String },
}

/// Errors surfaced to the invoking user on the command path.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("That's not an emoji I recognize.")]
    UnrecognizedEmoji,

    #[error("Role \"{0}\" not found.")]
    RoleNotFound(String),

    #[error("Usage: `{usage}`")]
    MissingArgument { usage: String },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for command operations.
pub type CommandResult<T> = std::result::Result<T, CommandError>;
