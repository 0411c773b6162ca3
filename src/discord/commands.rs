//! Moderator commands (!addreact, !listreact, etc).
//!
//! Parsing and execution are kept apart from serenity so the command
//! behaviour can be driven with fake emoji directories and appliers.

use std::time::Duration;

use serenity::model::guild::Guild;
use serenity::model::id::{GuildId, RoleId, UserId};
use serenity::model::permissions::Permissions;
use tracing::{debug, info};

use crate::common::error::{CommandError, CommandResult};
use crate::common::MessageRef;
use crate::discord::format::{format_trigger_list, paginate, MESSAGE_LIMIT, WARNING_PREFIX};
use crate::reactions::emoji::expand_shortcode;
use crate::reactions::resolver::canonicalize;
use crate::reactions::{
    AddOutcome, ApplyOutcome, EmojiDirectory, EmojiToken, ReactionApplier, Registry, RemoveOutcome,
};

/// How long the empty-list warning stays in chat.
pub const EMPTY_LIST_TTL: Duration = Duration::from_secs(30);

pub const DM_REPLY: &str = "That command is not available in DMs.";
pub const GENERIC_FAILURE: &str = "Something went wrong while handling that command.";

/// A parsed reaction command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactCommand {
    AddReact { word: String, emoji: String },
    DelReact { word: String, emoji: String },
    ListReact,
    SetReactRole { role: String },
    ClearReactRole,
    Help,
}

/// Parse a message as a reaction command.
///
/// Returns `None` when the message is not one of our commands, and
/// `Some(Err(..))` when it is but arguments are missing.
pub fn parse_command(prefix: &str, content: &str) -> Option<CommandResult<ReactCommand>> {
    let body = content.trim().strip_prefix(prefix)?;
    let (name, rest) = match body.find(char::is_whitespace) {
        Some(i) => (&body[..i], body[i..].trim()),
        None => (body, ""),
    };

    let missing = |usage: &str| -> CommandResult<ReactCommand> {
        Err(CommandError::MissingArgument {
            usage: format!("{}{}", prefix, usage),
        })
    };

    let command = match name.to_lowercase().as_str() {
        "addreact" | "delreact" => {
            let args = split_args(rest);
            let (word, emoji) = match args.as_slice() {
                [word, emoji, ..] if !word.is_empty() && !emoji.is_empty() => {
                    (word.clone(), emoji.clone())
                }
                _ => return Some(missing(&format!("{} <word> <emoji>", name.to_lowercase()))),
            };
            if name.eq_ignore_ascii_case("addreact") {
                ReactCommand::AddReact { word, emoji }
            } else {
                ReactCommand::DelReact { word, emoji }
            }
        }
        "listreact" => ReactCommand::ListReact,
        "setreactrole" => {
            let role = rest.trim_matches('"').trim();
            if role.is_empty() {
                return Some(missing("setreactrole <role>"));
            }
            ReactCommand::SetReactRole {
                role: role.to_string(),
            }
        }
        "clearreactrole" => ReactCommand::ClearReactRole,
        "reacthelp" => ReactCommand::Help,
        _ => return None,
    };

    debug!("Parsed command: {:?}", command);
    Some(Ok(command))
}

/// Split arguments on whitespace, keeping double-quoted runs together.
fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut started = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                started = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if started {
                    args.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        args.push(current);
    }
    args
}

#[derive(Debug, Clone)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: String,
    pub permissions: Permissions,
}

/// The parts of a guild the commands look at.
#[derive(Debug, Clone)]
pub struct GuildSnapshot {
    pub id: GuildId,
    pub name: String,
    pub owner_id: UserId,
    pub roles: Vec<RoleInfo>,
}

impl GuildSnapshot {
    pub fn from_guild(guild: &Guild) -> Self {
        Self {
            id: guild.id,
            name: guild.name.clone(),
            owner_id: guild.owner_id,
            roles: guild
                .roles
                .values()
                .map(|role| RoleInfo {
                    id: role.id,
                    name: role.name.clone(),
                    permissions: role.permissions,
                })
                .collect(),
        }
    }

    /// Owner, or any held role (including @everyone) granting
    /// ADMINISTRATOR or MANAGE_GUILD.
    pub fn is_moderator(&self, author: UserId, author_roles: &[RoleId]) -> bool {
        if author == self.owner_id {
            return true;
        }

        let everyone = RoleId::new(self.id.get());
        let granted = Permissions::ADMINISTRATOR | Permissions::MANAGE_GUILD;
        self.roles.iter().any(|role| {
            (role.id == everyone || author_roles.contains(&role.id))
                && role.permissions.intersects(granted)
        })
    }

    /// Look up a role by mention, raw id or case-insensitive name.
    pub fn find_role(&self, arg: &str) -> Option<&RoleInfo> {
        let arg = arg.trim();
        let id = arg
            .strip_prefix("<@&")
            .and_then(|s| s.strip_suffix('>'))
            .unwrap_or(arg);

        if let Ok(id) = id.parse::<u64>() {
            if let Some(role) = self.roles.iter().find(|role| role.id.get() == id) {
                return Some(role);
            }
        }

        self.roles
            .iter()
            .find(|role| role.name.to_lowercase() == arg.to_lowercase())
    }
}

/// What a command sends back to the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub pages: Vec<String>,
    /// Delete the reply after this long.
    pub delete_after: Option<Duration>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            pages: vec![text.into()],
            delete_after: None,
        }
    }

    pub fn transient(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            pages: vec![text.into()],
            delete_after: Some(ttl),
        }
    }

    /// Reply for a failed command. Internal failures get a generic message.
    pub fn for_error(error: &CommandError) -> Self {
        match error {
            CommandError::Store(_) | CommandError::Discord(_) => Self::text(GENERIC_FAILURE),
            user_facing => Self::text(user_facing.to_string()),
        }
    }
}

/// Everything a command needs from the invoking message and platform.
pub struct CommandContext<'a> {
    pub guild: &'a GuildSnapshot,
    pub prefix: &'a str,
    pub command_message: MessageRef,
    pub directory: &'a dyn EmojiDirectory,
    pub applier: &'a dyn ReactionApplier,
}

pub async fn execute(
    registry: &Registry,
    command: ReactCommand,
    ctx: &CommandContext<'_>,
) -> CommandResult<Reply> {
    let guild_id = ctx.guild.id;

    match command {
        ReactCommand::AddReact { word, emoji } => {
            let token = prepare_emoji(ctx, &emoji).await?;
            let reply = match registry.add_trigger(guild_id, &token, &word).await? {
                AddOutcome::Added => {
                    info!("Added reaction {} for '{}' in guild {}", token, word, guild_id);
                    "Successfully added this automatic reaction."
                }
                AddOutcome::AlreadyExists => "This automatic reaction already exists.",
            };
            Ok(Reply::text(reply))
        }
        ReactCommand::DelReact { word, emoji } => {
            let token = prepare_emoji(ctx, &emoji).await?;
            let reply = match registry.remove_trigger(guild_id, &token, &word).await? {
                RemoveOutcome::Removed => {
                    info!("Removed reaction {} for '{}' in guild {}", token, word, guild_id);
                    "Removed this automatic reaction."
                }
                RemoveOutcome::NotFound => "That automatic reaction does not exist.",
            };
            Ok(Reply::text(reply))
        }
        ReactCommand::ListReact => {
            let pairs = registry.list_triggers(guild_id).await?;
            match format_trigger_list(&ctx.guild.name, &pairs) {
                Some(text) => Ok(Reply {
                    pages: paginate(&text, MESSAGE_LIMIT),
                    delete_after: None,
                }),
                None => Ok(Reply::transient(
                    format!("{}There are no automatic reactions set in your server!", WARNING_PREFIX),
                    EMPTY_LIST_TTL,
                )),
            }
        }
        ReactCommand::SetReactRole { role } => {
            let found = ctx
                .guild
                .find_role(&role)
                .ok_or_else(|| CommandError::RoleNotFound(role.clone()))?;
            registry.set_role_restriction(guild_id, Some(found.id)).await?;
            info!("Reactions in guild {} restricted to role {}", guild_id, found.id);
            Ok(Reply::text(format!(
                "✅ Automatic reactions will now only trigger for **{}**.",
                found.name
            )))
        }
        ReactCommand::ClearReactRole => {
            registry.set_role_restriction(guild_id, None).await?;
            info!("Reactions in guild {} no longer restricted", guild_id);
            Ok(Reply::text("✅ Automatic reactions will now trigger for everyone."))
        }
        ReactCommand::Help => Ok(Reply::text(help_text(ctx.prefix))),
    }
}

/// Turn user input into a stored token, proving it usable by reacting to
/// the command message with it.
async fn prepare_emoji(ctx: &CommandContext<'_>, raw: &str) -> CommandResult<EmojiToken> {
    let token: EmojiToken = expand_shortcode(raw)
        .parse()
        .map_err(|_| CommandError::UnrecognizedEmoji)?;
    let token = canonicalize(ctx.directory, token).ok_or(CommandError::UnrecognizedEmoji)?;

    match ctx
        .applier
        .apply_reaction(ctx.command_message, &token.to_reaction_type())
        .await
    {
        ApplyOutcome::Applied => Ok(token),
        outcome => {
            debug!("Probe reaction with {} failed: {:?}", token, outcome);
            Err(CommandError::UnrecognizedEmoji)
        }
    }
}

fn help_text(prefix: &str) -> String {
    format!(
        "**Automatic reaction commands:**\n\
         • `{p}addreact <word> <emoji>` - React with an emoji whenever a word is said\n\
         • `{p}delreact <word> <emoji>` - Remove an automatic reaction\n\
         • `{p}listreact` - List automatic reactions for this server\n\
         • `{p}setreactrole <role>` - Only react to members with this role\n\
         • `{p}clearreactrole` - React to everyone again\n\
         • `{p}reacthelp` - Show this help message",
        p = prefix
    )
}
