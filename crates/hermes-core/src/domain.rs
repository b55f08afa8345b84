/// Chat user id (Discord snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

/// Guild (server) id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GuildId(pub u64);

/// Text channel id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

/// A file attached to an inbound message.
///
/// The bytes are not part of the value; they are pulled on demand through
/// [`crate::ports::AttachmentFetcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: Option<String>,
    pub size: u64,
    pub url: String,
}

/// Platform-agnostic inbound message.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub author_id: UserId,
    pub author_is_bot: bool,
    /// Set by the adapter when the author is the bot's own account.
    pub from_self: bool,
    pub guild_id: Option<GuildId>,
    pub channel_id: Option<ChannelId>,
    pub attachments: Vec<Attachment>,
}
