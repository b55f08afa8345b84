use std::sync::Arc;

use hermes_core::{
    config::Config,
    features::{FeatureContext, FeatureRegistry, StorageFeature},
};
use hermes_discord::{DiscordChat, HttpAttachmentFetcher};
use hermes_s3::S3Store;

#[tokio::main]
async fn main() -> Result<(), hermes_core::Error> {
    hermes_core::logging::init("hermes")?;

    let cfg = Arc::new(Config::load()?);
    for warning in cfg.validate() {
        tracing::warn!("{warning}");
    }

    let store = Arc::new(S3Store::from_config(&cfg).await);
    let chat = Arc::new(DiscordChat::new(&cfg.discord_bot_token));

    let ctx = FeatureContext {
        cfg: cfg.clone(),
        store,
        chat: chat.clone(),
        fetcher: Arc::new(HttpAttachmentFetcher::default()),
    };

    let features = FeatureRegistry::new()
        .register(StorageFeature::NAME, StorageFeature::from_context)
        .load(&ctx);

    hermes_discord::router::run(cfg, chat, features)
        .await
        .map_err(|e| hermes_core::Error::External(format!("discord bot failed: {e}")))?;

    Ok(())
}
