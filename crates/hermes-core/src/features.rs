//! Static feature registry.
//!
//! Features are listed explicitly at startup. Each constructor runs on its own;
//! one that fails is logged and skipped while the rest still load.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::Config,
    domain::InboundMessage,
    pipeline::MessagePipeline,
    ports::{AttachmentFetcher, ChatPort, ObjectStore},
    presence::PresenceReporter,
    upload::Uploader,
    Result,
};

#[async_trait]
pub trait Feature: Send + Sync {
    fn name(&self) -> &str;

    /// Gateway session is ready.
    async fn on_ready(&self) {}

    async fn on_message(&self, _msg: &InboundMessage) {}

    /// Process is shutting down.
    fn shutdown(&self) {}
}

/// Everything a feature constructor may depend on.
#[derive(Clone)]
pub struct FeatureContext {
    pub cfg: Arc<Config>,
    pub store: Arc<dyn ObjectStore>,
    pub chat: Arc<dyn ChatPort>,
    pub fetcher: Arc<dyn AttachmentFetcher>,
}

type FeatureCtor = Box<dyn Fn(&FeatureContext) -> Result<Arc<dyn Feature>> + Send + Sync>;

#[derive(Default)]
pub struct FeatureRegistry {
    entries: Vec<(String, FeatureCtor)>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: impl Into<String>, ctor: F) -> Self
    where
        F: Fn(&FeatureContext) -> Result<Arc<dyn Feature>> + Send + Sync + 'static,
    {
        self.entries.push((name.into(), Box::new(ctor)));
        self
    }

    pub fn load(&self, ctx: &FeatureContext) -> LoadedFeatures {
        let mut features = Vec::with_capacity(self.entries.len());
        for (name, ctor) in &self.entries {
            match ctor(ctx) {
                Ok(feature) => {
                    tracing::info!("Loaded feature: {name}");
                    features.push(feature);
                }
                Err(e) => tracing::error!("Failed to load feature {name}: {e}"),
            }
        }
        LoadedFeatures { features }
    }
}

/// Loaded features in registration order.
#[derive(Clone, Default)]
pub struct LoadedFeatures {
    features: Vec<Arc<dyn Feature>>,
}

impl LoadedFeatures {
    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub async fn dispatch_ready(&self) {
        for f in &self.features {
            f.on_ready().await;
        }
    }

    pub async fn dispatch_message(&self, msg: &InboundMessage) {
        for f in &self.features {
            f.on_message(msg).await;
        }
    }

    pub fn shutdown(&self) {
        for f in &self.features {
            f.shutdown();
        }
    }
}

// ============== Storage feature ==============

/// Mirrors attachments of watched channels into the bucket and keeps the
/// presence line in sync with bucket statistics.
pub struct StorageFeature {
    pipeline: MessagePipeline,
    presence: PresenceReporter,
}

impl StorageFeature {
    pub const NAME: &'static str = "storage";

    pub fn from_context(ctx: &FeatureContext) -> Result<Arc<dyn Feature>> {
        let cfg = &ctx.cfg;
        let presence = PresenceReporter::new(
            ctx.store.clone(),
            ctx.chat.clone(),
            cfg.presence_refresh_delay,
        );
        let uploader = Uploader::new(
            ctx.store.clone(),
            ctx.fetcher.clone(),
            cfg.cdn_domain.clone(),
        );
        let pipeline = MessagePipeline::new(
            Arc::new(cfg.watched_channels.clone()),
            uploader,
            ctx.chat.clone(),
            presence.clone(),
        );
        Ok(Arc::new(Self { pipeline, presence }))
    }
}

#[async_trait]
impl Feature for StorageFeature {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn on_ready(&self) {
        self.presence.refresh_now().await;
    }

    async fn on_message(&self, msg: &InboundMessage) {
        self.pipeline.on_message(msg).await;
    }

    fn shutdown(&self) {
        self.presence.shutdown();
    }
}
