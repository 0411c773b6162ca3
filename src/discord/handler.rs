//! Discord event handling.
//!
//! Commands are handled first; any other guild message goes through the
//! reaction dispatcher.

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Guild;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::common::error::CommandError;
use crate::common::{IncomingMessage, MessageRef};
use crate::discord::commands::{
    execute, parse_command, CommandContext, GuildSnapshot, Reply, DM_REPLY,
};
use crate::discord::platform::{CacheEmojiDirectory, HttpReactionApplier};
use crate::reactions::ReactionDispatcher;

/// Discord event handler.
#[derive(Clone)]
pub struct ReactionHandler {
    dispatcher: Arc<ReactionDispatcher>,
    prefix: String,
}

impl ReactionHandler {
    pub fn new(dispatcher: Arc<ReactionDispatcher>, prefix: String) -> Self {
        Self { dispatcher, prefix }
    }

    /// Handle the message as a command.
    ///
    /// Returns `true` if the message was one of our commands, whether or not
    /// the author was allowed to run it.
    async fn handle_command(&self, ctx: &Context, msg: &Message) -> bool {
        let Some(parsed) = parse_command(&self.prefix, &msg.content) else {
            return false;
        };
        if msg.author.bot {
            return true;
        }

        let Some(guild_id) = msg.guild_id else {
            send_reply(ctx, msg, Reply::text(DM_REPLY)).await;
            return true;
        };

        let Some(guild) = snapshot_guild(ctx, guild_id) else {
            warn!("Guild {} not in cache, ignoring command", guild_id);
            return true;
        };

        let incoming = IncomingMessage::from(msg);
        if !guild.is_moderator(incoming.author_id, &incoming.author_roles) {
            debug!(
                "Ignoring command from {} in guild {}: not a moderator",
                msg.author.name, guild_id
            );
            return true;
        }

        let reply = match parsed {
            Ok(command) => {
                info!("{:?} from {} in guild {}", command, msg.author.name, guild.name);

                let directory = CacheEmojiDirectory::new(ctx.cache.clone());
                let applier = HttpReactionApplier::new(ctx.http.clone());
                let command_ctx = CommandContext {
                    guild: &guild,
                    prefix: &self.prefix,
                    command_message: incoming.target,
                    directory: &directory,
                    applier: &applier,
                };

                match execute(self.dispatcher.registry(), command, &command_ctx).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        if matches!(e, CommandError::Store(_) | CommandError::Discord(_)) {
                            error!("Command failed in guild {}: {}", guild_id, e);
                        }
                        Reply::for_error(&e)
                    }
                }
            }
            Err(e) => Reply::for_error(&e),
        };

        send_reply(ctx, msg, reply).await;
        true
    }
}

/// Copy what the commands need out of the cache. The cache guard must not
/// be held across an await.
fn snapshot_guild(ctx: &Context, guild_id: GuildId) -> Option<GuildSnapshot> {
    ctx.cache
        .guild(guild_id)
        .map(|guild| GuildSnapshot::from_guild(&guild))
}

async fn send_reply(ctx: &Context, msg: &Message, reply: Reply) {
    for page in &reply.pages {
        let sent = match msg.channel_id.say(&ctx.http, page).await {
            Ok(sent) => sent,
            Err(e) => {
                error!("Failed to send reply to channel {}: {}", msg.channel_id, e);
                return;
            }
        };

        if let Some(ttl) = reply.delete_after {
            let http = ctx.http.clone();
            let target = MessageRef {
                channel_id: sent.channel_id,
                message_id: sent.id,
            };
            tokio::spawn(async move {
                sleep(ttl).await;
                if let Err(e) = http
                    .delete_message(target.channel_id, target.message_id, None)
                    .await
                {
                    debug!("Failed to delete message {}: {}", target.message_id, e);
                }
            });
        }
    }
}

#[async_trait]
impl EventHandler for ReactionHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore our own messages
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }

        if self.handle_command(&ctx, &msg).await {
            return;
        }

        let incoming = IncomingMessage::from(&msg);
        let directory = CacheEmojiDirectory::new(ctx.cache.clone());
        let applier = HttpReactionApplier::new(ctx.http.clone());

        let outcome = self.dispatcher.dispatch(&incoming, &directory, &applier).await;
        debug!("Message {} -> {:?}", msg.id, outcome);
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "Discord bot connected as {} ({} guilds)",
            ready.user.name,
            ready.guilds.len()
        );
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        info!(
            "Received guild data for '{}' ({} emojis){}",
            guild.name,
            guild.emojis.len(),
            if self.dispatcher.is_enabled(guild.id) {
                ""
            } else {
                ", reactions disabled"
            }
        );
    }
}
