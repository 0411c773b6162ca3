//! Shared types used across the application.

use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};

/// Addresses a single message that can receive a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// A chat message as seen by the reaction dispatcher.
///
/// Decoupled from serenity's `Message` so the dispatcher can be driven
/// without a gateway connection.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub target: MessageRef,
    /// None for direct messages.
    pub guild_id: Option<GuildId>,
    pub author_id: UserId,
    pub author_is_bot: bool,
    pub author_roles: Vec<RoleId>,
    pub content: String,
}

impl IncomingMessage {
    /// Every member holds @everyone, whose id is the guild id, though
    /// Discord never lists it among the member's roles.
    pub fn has_role(&self, role_id: RoleId) -> bool {
        let everyone = self.guild_id.map(|guild_id| RoleId::new(guild_id.get()));
        everyone == Some(role_id) || self.author_roles.contains(&role_id)
    }
}

impl From<&Message> for IncomingMessage {
    fn from(msg: &Message) -> Self {
        Self {
            target: MessageRef {
                channel_id: msg.channel_id,
                message_id: msg.id,
            },
            guild_id: msg.guild_id,
            author_id: msg.author.id,
            author_is_bot: msg.author.bot,
            author_roles: msg
                .member
                .as_ref()
                .map(|member| member.roles.clone())
                .unwrap_or_default(),
            content: msg.content.clone(),
        }
    }
}
