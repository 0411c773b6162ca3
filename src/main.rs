//! Selective React - automatic trigger-word reactions for Discord
//!
//! Watches guild chat and reacts with a configured emoji whenever a
//! moderator-defined trigger word appears in a message.

mod common;
mod config;
mod discord;
mod reactions;
mod storage;

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use config::{env::get_config_path, load_and_validate};
use discord::DiscordBotBuilder;
use reactions::{ReactionDispatcher, Registry};
use storage::{GuildStore, JsonFileStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Selective React v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Command prefix: {}", config.discord.prefix);
    info!("  Disabled guilds: {}", config.reactions.disabled_guilds.len());

    let store: Arc<dyn GuildStore> = if config.storage.is_in_memory() {
        warn!("storage.path is empty: reaction settings will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let store = JsonFileStore::open(&config.storage.path).await.map_err(|e| {
            error!("Failed to open reaction store: {}", e);
            e
        })?;
        info!("  Reaction store: {}", store.path().display());
        Arc::new(store)
    };

    let registry = Arc::new(Registry::new(store));
    let dispatcher = Arc::new(ReactionDispatcher::new(
        registry,
        config.reactions.disabled_guild_ids(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let discord_bot = DiscordBotBuilder::new(
        config.discord.token.clone(),
        config.discord.prefix.clone(),
        dispatcher,
        shutdown_rx,
    )
    .build()
    .await?;

    info!("Starting Discord bot...");
    let mut discord_task = tokio::spawn(async move {
        discord_bot.run().await;
    });

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - disconnecting...");
            true
        }
        _ = &mut discord_task => false,
    };

    if shutdown {
        if let Err(e) = shutdown_tx.send(true) {
            debug!("Shutdown channel closed (Discord task already exited): {}", e);
        }
        let timeout = tokio::time::Duration::from_secs(5);
        match tokio::time::timeout(timeout, discord_task).await {
            Ok(Ok(())) => info!("Discord client stopped gracefully"),
            Ok(Err(e)) => warn!("Discord task panicked: {}", e),
            Err(_) => warn!("Discord shutdown timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
