use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    classify::{classify, extension_of},
    domain::Attachment,
    errors::UploadError,
    keys::KeyAllocator,
    ports::{AttachmentFetcher, ObjectStore, PutObject},
};

pub const CONTENT_DISPOSITION: &str = "inline";

/// Copies attachments into the bucket and hands back their public URL.
#[derive(Clone)]
pub struct Uploader {
    keys: KeyAllocator,
    store: Arc<dyn ObjectStore>,
    fetcher: Arc<dyn AttachmentFetcher>,
    cdn_domain: String,
}

impl Uploader {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn AttachmentFetcher>,
        cdn_domain: impl Into<String>,
    ) -> Self {
        Self {
            keys: KeyAllocator::new(store.clone()),
            store,
            fetcher,
            cdn_domain: cdn_domain.into(),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("https://{}/{key}", self.cdn_domain)
    }

    pub async fn upload(&self, attachment: &Attachment) -> Result<String, UploadError> {
        self.upload_at(attachment, Utc::now()).await
    }

    pub async fn upload_at(
        &self,
        attachment: &Attachment,
        now: DateTime<Utc>,
    ) -> Result<String, UploadError> {
        let category = classify(&extension_of(&attachment.filename));

        let key = self
            .keys
            .allocate(category.as_str(), &attachment.filename, now)
            .await
            .map_err(UploadError::Allocation)?;

        let body = self
            .fetcher
            .fetch(attachment)
            .await
            .map_err(UploadError::Fetch)?;

        self.store
            .put_object(PutObject {
                key: key.clone(),
                body,
                content_type: attachment.content_type.clone(),
                content_disposition: CONTENT_DISPOSITION.to_string(),
            })
            .await
            .map_err(UploadError::Write)?;

        tracing::info!(filename = %attachment.filename, %key, "uploaded attachment");
        Ok(self.public_url(&key))
    }
}
