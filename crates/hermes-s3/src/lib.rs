//! S3 adapter (aws-sdk-s3).
//!
//! Implements the `hermes-core` ObjectStore port for a single bucket.

use async_trait::async_trait;

use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};

use hermes_core::{
    config::Config,
    errors::Error,
    ports::{ObjectPage, ObjectStore, ObjectSummary, PutObject},
    Result,
};

#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client for the configured region.
    ///
    /// Explicit keys from the config are used when present; otherwise the SDK
    /// default credential chain applies (env, profile, instance role).
    pub async fn from_config(cfg: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(cfg.s3_region.clone()));

        if let (Some(id), Some(secret)) = (&cfg.aws_access_key_id, &cfg.aws_secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                id.clone(),
                secret.clone(),
                None,
                None,
                "hermes-config",
            ));
        }

        let sdk = loader.load().await;
        tracing::info!(bucket = %cfg.s3_bucket_name, region = %cfg.s3_region, "S3 client ready");
        Self::new(Client::new(&sdk), cfg.s3_bucket_name.clone())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn map_err<E>(op: &str, key: &str, e: E) -> Error
    where
        E: std::error::Error,
    {
        Error::Store(format!("{op} {key}: {}", DisplayErrorContext(&e)))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, key: &str) -> Result<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(Self::map_err("HeadObject", key, service_err))
                }
            }
        }
    }

    async fn put_object(&self, req: PutObject) -> Result<()> {
        let PutObject {
            key,
            body,
            content_type,
            content_disposition,
        } = req;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_disposition(content_disposition)
            .set_content_type(content_type)
            .send()
            .await
            .map_err(|e| Self::map_err("PutObject", &key, e))?;
        Ok(())
    }

    async fn list_page(&self, continuation: Option<String>) -> Result<ObjectPage> {
        let out = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(|e| Self::map_err("ListObjectsV2", &self.bucket, e))?;

        let objects = out
            .contents()
            .iter()
            .map(|o| ObjectSummary {
                key: o.key().unwrap_or_default().to_string(),
                size: o.size().unwrap_or(0).max(0) as u64,
            })
            .collect();

        let next = if out.is_truncated().unwrap_or(false) {
            out.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ObjectPage { objects, next })
    }
}
