//! Hexagonal ports. Discord and S3 live behind these traits in adapter crates.

use async_trait::async_trait;

use crate::{
    domain::{Attachment, ChannelId},
    Result,
};

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatPort: Send + Sync {
    async fn send_text(&self, channel: ChannelId, text: &str) -> Result<()>;

    /// Replace the bot's presence/status line.
    async fn set_presence(&self, text: &str) -> Result<()>;
}

/// Pulls attachment bytes from the chat platform's CDN.
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn fetch(&self, attachment: &Attachment) -> Result<Vec<u8>>;
}

/// Parameters of a single object write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PutObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub content_disposition: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
}

/// One page of a bucket listing.
#[derive(Clone, Debug, Default)]
pub struct ObjectPage {
    pub objects: Vec<ObjectSummary>,
    /// `None` on the last page.
    pub next: Option<String>,
}

/// Bucket-scoped object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// `Ok(false)` when the key does not exist; any other failure is an error.
    async fn exists(&self, key: &str) -> Result<bool>;

    async fn put_object(&self, req: PutObject) -> Result<()>;

    async fn list_page(&self, continuation: Option<String>) -> Result<ObjectPage>;
}
