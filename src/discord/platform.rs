//! serenity-backed implementations of the reaction seams.

use std::sync::Arc;

use serenity::async_trait;
use serenity::cache::Cache;
use serenity::http::{Http, HttpError};
use serenity::model::channel::ReactionType;

use crate::common::MessageRef;
use crate::reactions::{ApplyOutcome, CustomEmoji, EmojiDirectory, ReactionApplier};

/// Discord JSON error code for "Unknown Emoji".
const UNKNOWN_EMOJI_CODE: isize = 10014;

/// Emoji directory over the gateway cache.
///
/// Every call walks all cached guilds; nothing is indexed.
pub struct CacheEmojiDirectory {
    cache: Arc<Cache>,
}

impl CacheEmojiDirectory {
    pub fn new(cache: Arc<Cache>) -> Self {
        Self { cache }
    }
}

impl EmojiDirectory for CacheEmojiDirectory {
    fn visible_emojis(&self) -> Vec<CustomEmoji> {
        self.cache
            .guilds()
            .into_iter()
            .filter_map(|guild_id| {
                self.cache.guild(guild_id).map(|guild| {
                    guild
                        .emojis
                        .values()
                        .map(|emoji| CustomEmoji {
                            id: emoji.id,
                            name: emoji.name.clone(),
                            animated: emoji.animated,
                        })
                        .collect::<Vec<_>>()
                })
            })
            .flatten()
            .collect()
    }
}

/// Posts reactions through the REST API.
pub struct HttpReactionApplier {
    http: Arc<Http>,
}

impl HttpReactionApplier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReactionApplier for HttpReactionApplier {
    async fn apply_reaction(&self, target: MessageRef, reaction: &ReactionType) -> ApplyOutcome {
        match self
            .http
            .create_reaction(target.channel_id, target.message_id, reaction)
            .await
        {
            Ok(()) => ApplyOutcome::Applied,
            Err(e) => classify_reaction_error(&e),
        }
    }
}

/// Map a failed reaction request onto an outcome.
pub fn classify_reaction_error(error: &serenity::Error) -> ApplyOutcome {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) = error {
        let status = response.status_code.as_u16();
        if status == 403 {
            return ApplyOutcome::Forbidden;
        }
        if response.error.code == UNKNOWN_EMOJI_CODE || status == 400 {
            return ApplyOutcome::Unrecognized;
        }
    }
    ApplyOutcome::Failed(error.to_string())
}
