//! Emoji resolution against the emojis visible to the bot.
//!
//! Literal tokens always resolve to themselves. Custom tokens resolve only
//! while an emoji with the same id is visible in some guild the bot is in.
//! The lookup is a live scan of the directory on every call.

use serenity::model::channel::ReactionType;
use serenity::model::id::EmojiId;

use crate::reactions::emoji::EmojiToken;

/// A custom emoji the bot can currently see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEmoji {
    pub id: EmojiId,
    pub name: String,
    pub animated: bool,
}

impl CustomEmoji {
    pub fn token(&self) -> EmojiToken {
        EmojiToken::Custom {
            id: self.id,
            name: self.name.clone(),
            animated: self.animated,
        }
    }
}

/// Source of the custom emojis visible across every guild the bot is in.
pub trait EmojiDirectory: Send + Sync {
    fn visible_emojis(&self) -> Vec<CustomEmoji>;

    fn find(&self, id: EmojiId) -> Option<CustomEmoji> {
        self.visible_emojis().into_iter().find(|emoji| emoji.id == id)
    }
}

/// Outcome of resolving a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ReactionType),
    Unresolvable,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Resolve a parsed token into something that can be posted as a reaction.
pub fn resolve(directory: &dyn EmojiDirectory, token: &EmojiToken) -> Resolution {
    match token {
        EmojiToken::Literal(_) => Resolution::Resolved(token.to_reaction_type()),
        EmojiToken::Custom { id, .. } => match directory.find(*id) {
            Some(emoji) => Resolution::Resolved(emoji.token().to_reaction_type()),
            None => Resolution::Unresolvable,
        },
    }
}

/// Resolve a stored token string. Tokens that no longer parse are dead.
pub fn resolve_stored(directory: &dyn EmojiDirectory, stored: &str) -> Resolution {
    match stored.parse::<EmojiToken>() {
        Ok(token) => resolve(directory, &token),
        Err(_) => Resolution::Unresolvable,
    }
}

/// Canonicalise a custom token from the directory's own name and animated
/// flag. Literal tokens pass through. `None` when the custom id is not visible.
pub fn canonicalize(directory: &dyn EmojiDirectory, token: EmojiToken) -> Option<EmojiToken> {
    match token {
        EmojiToken::Literal(_) => Some(token),
        EmojiToken::Custom { id, .. } => directory.find(id).map(|emoji| emoji.token()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Fixed emoji directory for tests.
    #[derive(Debug, Default, Clone)]
    pub struct StaticDirectory {
        pub emojis: Vec<CustomEmoji>,
    }

    impl StaticDirectory {
        pub fn with(ids: &[(u64, &str)]) -> Self {
            Self {
                emojis: ids
                    .iter()
                    .map(|(id, name)| CustomEmoji {
                        id: EmojiId::new(*id),
                        name: name.to_string(),
                        animated: false,
                    })
                    .collect(),
            }
        }
    }

    impl EmojiDirectory for StaticDirectory {
        fn visible_emojis(&self) -> Vec<CustomEmoji> {
            self.emojis.clone()
        }
    }
}
