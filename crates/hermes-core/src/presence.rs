//! Bucket statistics published as the bot's presence.
//!
//! Uploads ask for a refresh through [`PresenceReporter::schedule_refresh`];
//! requests arriving while one is already pending are dropped, so a burst of
//! uploads costs a single bucket listing.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio_util::sync::CancellationToken;

use crate::{
    ports::{ChatPort, ObjectStore},
    utils::format_size,
    Result,
};

pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_secs(45);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BucketStats {
    pub total_files: u64,
    pub total_bytes: u64,
}

pub fn presence_text(stats: BucketStats) -> String {
    format!(
        "Managing {} files ({})",
        stats.total_files,
        format_size(stats.total_bytes)
    )
}

#[derive(Clone)]
pub struct PresenceReporter {
    inner: Arc<ReporterInner>,
}

struct ReporterInner {
    store: Arc<dyn ObjectStore>,
    chat: Arc<dyn ChatPort>,
    delay: Duration,
    pending: AtomicBool,
    cancel: CancellationToken,
}

impl PresenceReporter {
    pub fn new(store: Arc<dyn ObjectStore>, chat: Arc<dyn ChatPort>, delay: Duration) -> Self {
        Self {
            inner: Arc::new(ReporterInner {
                store,
                chat,
                delay,
                pending: AtomicBool::new(false),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Walk every page of the bucket listing.
    pub async fn bucket_stats(&self) -> Result<BucketStats> {
        let mut stats = BucketStats::default();
        let mut continuation = None;
        loop {
            let page = self.inner.store.list_page(continuation).await?;
            stats.total_files += page.objects.len() as u64;
            stats.total_bytes += page.objects.iter().map(|o| o.size).sum::<u64>();

            match page.next {
                Some(token) => continuation = Some(token),
                None => return Ok(stats),
            }
        }
    }

    /// Recompute and publish. Failures are logged and swallowed.
    pub async fn refresh_now(&self) {
        if let Err(e) = self.try_refresh().await {
            tracing::error!("Failed to update presence: {e}");
        }
    }

    async fn try_refresh(&self) -> Result<()> {
        let stats = self.bucket_stats().await?;
        let text = presence_text(stats);
        self.inner.chat.set_presence(&text).await?;
        tracing::info!("Updated presence to: {text}");
        Ok(())
    }

    /// Run [`Self::refresh_now`] after the configured delay unless a refresh is
    /// already pending. Returns `true` when this call scheduled a new one.
    pub fn schedule_refresh(&self) -> bool {
        if self.inner.cancel.is_cancelled() {
            return false;
        }
        if self
            .inner
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("presence refresh already pending");
            return false;
        }

        let reporter = self.clone();
        let cancel = self.inner.cancel.clone();
        let delay = self.inner.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    reporter.inner.pending.store(false, Ordering::Release);
                    reporter.refresh_now().await;
                }
            }
        });
        true
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Drop any pending refresh and refuse new ones.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }
}
