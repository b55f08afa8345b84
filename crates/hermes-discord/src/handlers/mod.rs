//! Discord gateway event handling.
//!
//! Serenity events are converted into `hermes-core` types and fanned out to the
//! loaded features.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use serenity::{
    client::{Context, EventHandler},
    model::{channel::Message, gateway::Ready},
};

use hermes_core::{
    domain::{Attachment, ChannelId, GuildId, InboundMessage, UserId},
    features::LoadedFeatures,
};

use crate::DiscordChat;

pub struct Handler {
    chat: Arc<DiscordChat>,
    features: LoadedFeatures,
    self_id: AtomicU64,
}

impl Handler {
    pub fn new(chat: Arc<DiscordChat>, features: LoadedFeatures) -> Self {
        Self {
            chat,
            features,
            self_id: AtomicU64::new(0),
        }
    }

    fn self_id(&self) -> Option<u64> {
        match self.self_id.load(Ordering::Acquire) {
            0 => None,
            id => Some(id),
        }
    }
}

#[serenity::async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!("Bot connected as {}", ready.user.name);
        self.self_id.store(ready.user.id.get(), Ordering::Release);
        self.chat.attach_gateway(ctx).await;
        self.features.dispatch_ready().await;
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let inbound = to_inbound(&msg, self.self_id());
        self.features.dispatch_message(&inbound).await;
    }
}

pub fn to_inbound(msg: &Message, self_id: Option<u64>) -> InboundMessage {
    let author_id = msg.author.id.get();
    InboundMessage {
        author_id: UserId(author_id),
        author_is_bot: msg.author.bot,
        from_self: is_self(author_id, self_id),
        guild_id: msg.guild_id.map(|g| GuildId(g.get())),
        channel_id: Some(ChannelId(msg.channel_id.get())),
        attachments: msg
            .attachments
            .iter()
            .map(|a| Attachment {
                filename: a.filename.clone(),
                content_type: a.content_type.clone(),
                size: u64::from(a.size),
                url: a.url.clone(),
            })
            .collect(),
    }
}

fn is_self(author_id: u64, self_id: Option<u64>) -> bool {
    self_id == Some(author_id)
}
