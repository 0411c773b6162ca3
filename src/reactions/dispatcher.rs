//! Reaction dispatch for a single incoming message.
//!
//! Steps run strictly in order and stop at the first terminal state:
//! guild check, bot author, per-guild enable flag, URL suppression, role
//! gate, registry load, match, resolve, apply. At most one reaction is
//! applied per message.
//!
//! Failures on this path are never reported to chat. A matched custom emoji
//! that no longer resolves triggers a sweep of every dead entry in the guild
//! and the message gets no reaction, even if another trigger would have
//! matched a live emoji.

use std::collections::HashSet;
use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::ReactionType;
use serenity::model::id::GuildId;
use tracing::{debug, info, warn};

use crate::common::{IncomingMessage, MessageRef};
use crate::reactions::matcher::{contains_url, find_match};
use crate::reactions::registry::Registry;
use crate::reactions::resolver::{resolve_stored, EmojiDirectory, Resolution};

/// Outcome of posting a reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The platform does not allow the bot to react here.
    Forbidden,
    /// The platform does not know the emoji.
    Unrecognized,
    Failed(String),
}

/// Posts reactions to messages.
#[async_trait]
pub trait ReactionApplier: Send + Sync {
    async fn apply_reaction(&self, target: MessageRef, reaction: &ReactionType) -> ApplyOutcome;
}

/// Terminal state reached for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    NotInGuild,
    AuthorIsBot,
    Disabled,
    ContainsUrl,
    /// A restriction role is set and the author does not hold it.
    RoleGated,
    NoTriggers,
    NoMatch,
    /// The matched emoji no longer resolves; these entries were purged.
    DeadEmoji { purged: Vec<String> },
    Reacted(String),
    Forbidden,
    ReactionFailed,
    StoreUnavailable,
}

pub struct ReactionDispatcher {
    registry: Arc<Registry>,
    disabled_guilds: HashSet<GuildId>,
}

impl ReactionDispatcher {
    pub fn new(registry: Arc<Registry>, disabled_guilds: impl IntoIterator<Item = GuildId>) -> Self {
        Self {
            registry,
            disabled_guilds: disabled_guilds.into_iter().collect(),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn is_enabled(&self, guild_id: GuildId) -> bool {
        !self.disabled_guilds.contains(&guild_id)
    }

    pub async fn dispatch(
        &self,
        msg: &IncomingMessage,
        directory: &dyn EmojiDirectory,
        applier: &dyn ReactionApplier,
    ) -> DispatchOutcome {
        let Some(guild_id) = msg.guild_id else {
            return DispatchOutcome::NotInGuild;
        };
        if msg.author_is_bot {
            return DispatchOutcome::AuthorIsBot;
        }
        if !self.is_enabled(guild_id) {
            return DispatchOutcome::Disabled;
        }
        if contains_url(&msg.content) {
            return DispatchOutcome::ContainsUrl;
        }

        let role = match self.registry.role_restriction(guild_id).await {
            Ok(role) => role,
            Err(e) => {
                warn!("Failed to load role restriction for guild {}: {}", guild_id, e);
                return DispatchOutcome::StoreUnavailable;
            }
        };
        if let Some(role_id) = role {
            // A deleted role is held by nobody, so nobody passes the gate.
            if !msg.has_role(role_id) {
                return DispatchOutcome::RoleGated;
            }
        }

        let reactions = match self.registry.reactions(guild_id).await {
            Ok(reactions) => reactions,
            Err(e) => {
                warn!("Failed to load reactions for guild {}: {}", guild_id, e);
                return DispatchOutcome::StoreUnavailable;
            }
        };
        if reactions.is_empty() {
            return DispatchOutcome::NoTriggers;
        }

        let Some(emoji) = find_match(&msg.content, &reactions) else {
            return DispatchOutcome::NoMatch;
        };

        let reaction = match resolve_stored(directory, emoji) {
            Resolution::Resolved(reaction) => reaction,
            Resolution::Unresolvable => {
                info!(
                    "Emoji {} in guild {} no longer resolves, sweeping dead entries",
                    emoji, guild_id
                );
                return match self
                    .registry
                    .purge_dead(guild_id, |stored| resolve_stored(directory, stored).is_resolved())
                    .await
                {
                    Ok(purged) => DispatchOutcome::DeadEmoji { purged },
                    Err(e) => {
                        warn!("Failed to purge dead emojis for guild {}: {}", guild_id, e);
                        DispatchOutcome::StoreUnavailable
                    }
                };
            }
        };

        match applier.apply_reaction(msg.target, &reaction).await {
            ApplyOutcome::Applied => {
                debug!(
                    "Reacted with {} to message {} in guild {}",
                    emoji, msg.target.message_id, guild_id
                );
                DispatchOutcome::Reacted(emoji.to_string())
            }
            ApplyOutcome::Forbidden => {
                debug!(
                    "Not allowed to react in channel {} of guild {}",
                    msg.target.channel_id, guild_id
                );
                DispatchOutcome::Forbidden
            }
            ApplyOutcome::Unrecognized => {
                warn!("Discord rejected emoji {} in guild {}", emoji, guild_id);
                DispatchOutcome::ReactionFailed
            }
            ApplyOutcome::Failed(reason) => {
                warn!("Failed to react with {} in guild {}: {}", emoji, guild_id, reason);
                DispatchOutcome::ReactionFailed
            }
        }
    }
}
