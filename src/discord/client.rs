//! Discord bot client.
//!
//! Builds the serenity client and keeps it connected, rebuilding it with
//! backoff when the gateway connection fails.

use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::discord::handler::ReactionHandler;
use crate::reactions::ReactionDispatcher;

const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(5 * 60);

/// Gateway intents the bot needs: guild metadata and emoji for the cache,
/// plus message content for trigger matching.
pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_EMOJIS_AND_STICKERS
}

/// Builder for creating the Discord bot.
pub struct DiscordBotBuilder {
    token: String,
    prefix: String,
    dispatcher: Arc<ReactionDispatcher>,
    shutdown_rx: watch::Receiver<bool>,
}

impl DiscordBotBuilder {
    pub fn new(
        token: String,
        prefix: String,
        dispatcher: Arc<ReactionDispatcher>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            token,
            prefix,
            dispatcher,
            shutdown_rx,
        }
    }

    /// Build the Discord bot.
    pub async fn build(self) -> anyhow::Result<DiscordBot> {
        let handler = ReactionHandler::new(self.dispatcher, self.prefix);
        let client = build_client(&self.token, handler.clone()).await?;

        Ok(DiscordBot {
            client: Some(client),
            token: self.token,
            handler,
            shutdown_rx: self.shutdown_rx,
        })
    }
}

async fn build_client(token: &str, handler: ReactionHandler) -> anyhow::Result<Client> {
    let client = Client::builder(token, gateway_intents())
        .event_handler(handler)
        .await?;
    Ok(client)
}

/// Exponential backoff for Discord reconnection.
/// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
fn discord_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(5))
        .with_max_delay(MAX_RECONNECT_DELAY)
        .with_factor(1.1)
        .with_jitter()
        .without_max_times()
        .build()
}

pub struct DiscordBot {
    client: Option<Client>,
    token: String,
    handler: ReactionHandler,
    shutdown_rx: watch::Receiver<bool>,
}

impl DiscordBot {
    pub async fn run(mut self) {
        // Extract shard manager before we move client into run_connection
        let shard_manager = self.client.as_ref().map(|c| c.shard_manager.clone());
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::select! {
            _ = Self::run_connection(&mut self.client, &self.token, &self.handler) => {},
            _ = async {
                loop {
                    if shutdown_rx.changed().await.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                if let Some(ref manager) = shard_manager {
                    info!("Initiating graceful Discord shutdown...");
                    manager.shutdown_all().await;
                    info!("Discord shutdown complete");
                }
            } => {}
        }
        info!("Discord task ended");
    }

    async fn run_connection(client: &mut Option<Client>, token: &str, handler: &ReactionHandler) {
        let mut backoff = discord_backoff();

        loop {
            info!("Connecting to Discord...");

            let mut client = match client.take() {
                Some(client) => client,
                None => {
                    // serenity mostly handles reconnections itself.
                    match build_client(token, handler.clone()).await {
                        Ok(client) => {
                            backoff = discord_backoff();
                            client
                        }
                        Err(e) => {
                            error!("Failed to rebuild Discord client: {}", e);
                            let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                            warn!("Retrying in {:.1}s...", delay.as_secs_f64());
                            sleep(delay).await;
                            continue;
                        }
                    }
                }
            };

            match client.start().await {
                Ok(()) => {
                    info!("Discord client disconnected normally");
                    break;
                }
                Err(e) => {
                    error!("Discord client error: {}", e);
                    let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                    warn!(
                        "Discord disconnected. Reconnecting in {:.1}s...",
                        delay.as_secs_f64(),
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_cover_emoji_cache_and_content() {
        let intents = gateway_intents();
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(GatewayIntents::GUILD_EMOJIS_AND_STICKERS));
        assert!(!intents.contains(GatewayIntents::GUILD_PRESENCES));
    }

    #[test]
    fn test_backoff_is_bounded() {
        let delays: Vec<Duration> = discord_backoff().take(100).collect();
        assert_eq!(delays.len(), 100);
        assert!(delays.iter().all(|d| *d <= MAX_RECONNECT_DELAY * 2));
    }
}
