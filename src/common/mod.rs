//! Common utilities and types shared across the application.

pub mod error;
pub mod types;

pub use error::EmojiParseError;
pub use types::{IncomingMessage, MessageRef};
