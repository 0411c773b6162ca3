//! Emoji tokens as stored in the registry.
//!
//! A token is either a literal unicode emoji or a reference to a custom
//! guild emoji written `<:name:id>` (or `<a:name:id>` when animated).
//! Parsing happens once at the registry boundary; everything downstream
//! works with the tagged [`EmojiToken`].

use std::fmt;
use std::str::FromStr;

use serenity::model::channel::ReactionType;
use serenity::model::id::EmojiId;

use crate::common::EmojiParseError;

/// A parsed emoji token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmojiToken {
    /// Unicode emoji, compared by string equality.
    Literal(String),
    /// Reference to a custom guild emoji, resolved by id.
    Custom {
        id: EmojiId,
        name: String,
        animated: bool,
    },
}

impl EmojiToken {
    /// The reaction payload for this token, without any directory lookup.
    pub fn to_reaction_type(&self) -> ReactionType {
        match self {
            Self::Literal(emoji) => ReactionType::Unicode(emoji.clone()),
            Self::Custom { id, name, animated } => ReactionType::Custom {
                animated: *animated,
                id: *id,
                name: Some(name.clone()),
            },
        }
    }
}

impl FromStr for EmojiToken {
    type Err = EmojiParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmojiParseError::Empty);
        }

        if s.starts_with("<:") || s.starts_with("<a:") {
            return parse_custom(s).ok_or_else(|| EmojiParseError::MalformedCustom {
                token: s.to_string(),
            });
        }

        Ok(Self::Literal(s.to_string()))
    }
}

impl fmt::Display for EmojiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(emoji) => f.write_str(emoji),
            Self::Custom { id, name, animated } => {
                let prefix = if *animated { "a" } else { "" };
                write!(f, "<{}:{}:{}>", prefix, name, id)
            }
        }
    }
}

fn parse_custom(s: &str) -> Option<EmojiToken> {
    let inner = s.strip_prefix('<')?.strip_suffix('>')?;
    let mut parts = inner.split(':');

    let animated = match parts.next()? {
        "" => false,
        "a" => true,
        _ => return None,
    };
    let name = parts.next()?;
    let id = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    // Zero is not a valid snowflake.
    let id = id.parse::<u64>().ok().filter(|id| *id != 0)?;

    Some(EmojiToken::Custom {
        id: EmojiId::new(id),
        name: name.to_string(),
        animated,
    })
}

/// Replace a `:shortcode:` argument with its unicode emoji.
///
/// Anything that is not a known shortcode is returned unchanged.
pub fn expand_shortcode(input: &str) -> String {
    let trimmed = input.trim();
    trimmed
        .strip_prefix(':')
        .and_then(|rest| rest.strip_suffix(':'))
        .filter(|code| !code.is_empty())
        .and_then(|code| emojis::get_by_shortcode(&code.to_lowercase()))
        .map(|emoji| emoji.as_str().to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
