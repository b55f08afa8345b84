//! Discord adapter (serenity).
//!
//! This crate implements the `hermes-core` ChatPort and AttachmentFetcher over
//! the Discord API.

use std::sync::Arc;

use async_trait::async_trait;

use serenity::{
    all::{ActivityData, CreateMessage},
    client::Context,
    http::Http,
};

use tokio::sync::RwLock;

pub mod handlers;
pub mod router;

use hermes_core::{
    domain::{Attachment, ChannelId},
    errors::Error,
    ports::{AttachmentFetcher, ChatPort},
    Result,
};

/// Replies go over REST; presence needs the live gateway shard, which only
/// exists once the `ready` event has fired.
pub struct DiscordChat {
    http: Arc<Http>,
    gateway: RwLock<Option<Context>>,
}

impl DiscordChat {
    pub fn new(token: &str) -> Self {
        Self {
            http: Arc::new(Http::new(token)),
            gateway: RwLock::new(None),
        }
    }

    pub fn http(&self) -> Arc<Http> {
        self.http.clone()
    }

    pub(crate) async fn attach_gateway(&self, ctx: Context) {
        *self.gateway.write().await = Some(ctx);
    }

    fn map_err(e: serenity::Error) -> Error {
        Error::Chat(format!("discord error: {e}"))
    }
}

#[async_trait]
impl ChatPort for DiscordChat {
    async fn send_text(&self, channel: ChannelId, text: &str) -> Result<()> {
        serenity::all::ChannelId::new(channel.0)
            .send_message(&self.http, CreateMessage::new().content(text))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_presence(&self, text: &str) -> Result<()> {
        let gateway = self.gateway.read().await;
        let Some(ctx) = gateway.as_ref() else {
            return Err(Error::Chat("gateway is not connected yet".to_string()));
        };
        ctx.set_activity(Some(ActivityData::custom(text)));
        Ok(())
    }
}

/// Downloads attachment bytes from Discord's CDN.
#[derive(Clone, Default)]
pub struct HttpAttachmentFetcher {
    client: reqwest::Client,
}

impl HttpAttachmentFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AttachmentFetcher for HttpAttachmentFetcher {
    async fn fetch(&self, attachment: &Attachment) -> Result<Vec<u8>> {
        let map_err = |e: reqwest::Error| Error::Fetch(format!("{}: {e}", attachment.filename));

        let resp = self
            .client
            .get(&attachment.url)
            .send()
            .await
            .map_err(map_err)?
            .error_for_status()
            .map_err(map_err)?;
        let bytes = resp.bytes().await.map_err(map_err)?;
        Ok(bytes.to_vec())
    }
}
