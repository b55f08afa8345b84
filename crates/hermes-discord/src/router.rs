use std::sync::Arc;

use serenity::{client::Client, model::gateway::GatewayIntents};

use hermes_core::{config::Config, features::LoadedFeatures};

use crate::{handlers::Handler, DiscordChat};

/// Connect to the gateway and dispatch events until the client stops or the
/// process receives Ctrl-C.
pub async fn run(
    cfg: Arc<Config>,
    chat: Arc<DiscordChat>,
    features: LoadedFeatures,
) -> anyhow::Result<()> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    tracing::info!(
        version = hermes_core::config::Config::version(),
        watched_channels = cfg.watched_channels.len(),
        administrators = cfg.bot_administrators.len(),
        features = ?features.names(),
        "starting Discord client"
    );

    let handler = Handler::new(chat, features.clone());
    let mut client = Client::builder(&cfg.discord_bot_token, intents)
        .event_handler(handler)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            shard_manager.shutdown_all().await;
        }
    });

    let result = client.start().await;
    features.shutdown();
    result?;

    Ok(())
}
