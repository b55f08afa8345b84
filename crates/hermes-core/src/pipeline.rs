use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    domain::InboundMessage, gate::WatchedChannels, ports::ChatPort, presence::PresenceReporter,
    upload::Uploader, utils::truncate_text,
};

/// Discord rejects messages above 2000 characters.
const MAX_REPLY_LEN: usize = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    OwnMessage,
    BotAuthor,
    NoGuildContext,
    Unwatched,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineOutcome {
    Ignored(IgnoreReason),
    Processed { uploaded: usize, failed: usize },
}

/// Watched channel -> upload every attachment -> reply per attachment ->
/// schedule a presence refresh.
#[derive(Clone)]
pub struct MessagePipeline {
    watched: Arc<WatchedChannels>,
    uploader: Uploader,
    chat: Arc<dyn ChatPort>,
    presence: PresenceReporter,
}

impl MessagePipeline {
    pub fn new(
        watched: Arc<WatchedChannels>,
        uploader: Uploader,
        chat: Arc<dyn ChatPort>,
        presence: PresenceReporter,
    ) -> Self {
        Self {
            watched,
            uploader,
            chat,
            presence,
        }
    }

    pub async fn on_message(&self, msg: &InboundMessage) -> PipelineOutcome {
        self.on_message_at(msg, Utc::now()).await
    }

    /// Same as `on_message` with the upload clock pinned to `now`.
    pub async fn on_message_at(
        &self,
        msg: &InboundMessage,
        now: DateTime<Utc>,
    ) -> PipelineOutcome {
        if msg.from_self {
            return PipelineOutcome::Ignored(IgnoreReason::OwnMessage);
        }
        if msg.author_is_bot {
            return PipelineOutcome::Ignored(IgnoreReason::BotAuthor);
        }

        let (Some(guild_id), Some(channel_id)) = (msg.guild_id, msg.channel_id) else {
            tracing::debug!("Message ignored (no guild/channel context).");
            return PipelineOutcome::Ignored(IgnoreReason::NoGuildContext);
        };

        if !self.watched.is_watched(Some(guild_id), Some(channel_id)) {
            tracing::debug!(
                guild = guild_id.0,
                channel = channel_id.0,
                "Message ignored (not in monitored guild/channel)."
            );
            return PipelineOutcome::Ignored(IgnoreReason::Unwatched);
        }

        tracing::info!(
            guild = guild_id.0,
            channel = channel_id.0,
            attachments = msg.attachments.len(),
            "Processing message"
        );

        let mut uploaded = 0;
        let mut failed = 0;
        for attachment in &msg.attachments {
            let reply = match self.uploader.upload_at(attachment, now).await {
                Ok(url) => {
                    uploaded += 1;
                    format!("File uploaded successfully: {url}")
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        filename = %attachment.filename,
                        "Failed to upload {} to storage: {e}",
                        attachment.filename
                    );
                    format!("File upload failed: {e}")
                }
            };

            let reply = truncate_text(&reply, MAX_REPLY_LEN);
            if let Err(e) = self.chat.send_text(channel_id, &reply).await {
                tracing::warn!(filename = %attachment.filename, "Failed to send reply: {e}");
            }
        }

        // Every watched message refreshes, attachments or not.
        self.presence.schedule_refresh();

        PipelineOutcome::Processed { uploaded, failed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChannelId, GuildId, UserId},
        presence::DEFAULT_REFRESH_DELAY,
        testing::{attachment, EchoFetcher, MemoryStore, RecordingChat},
    };
    use chrono::TimeZone;
    use std::{sync::atomic::Ordering, time::Duration};

    struct Harness {
        store: Arc<MemoryStore>,
        chat: Arc<RecordingChat>,
        fetcher: Arc<EchoFetcher>,
        pipeline: MessagePipeline,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let chat = Arc::new(RecordingChat::default());
        let fetcher = Arc::new(EchoFetcher::default());
        let watched = Arc::new(WatchedChannels::parse("100:200").unwrap());
        let uploader = Uploader::new(store.clone(), fetcher.clone(), "cdn.example.com");
        let presence = PresenceReporter::new(store.clone(), chat.clone(), DEFAULT_REFRESH_DELAY);
        let pipeline = MessagePipeline::new(watched, uploader, chat.clone(), presence);
        Harness {
            store,
            chat,
            fetcher,
            pipeline,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 31, 23, 59, 59).unwrap()
    }

    fn message(guild: u64, channel: u64, files: &[&str]) -> InboundMessage {
        InboundMessage {
            author_id: UserId(7),
            author_is_bot: false,
            from_self: false,
            guild_id: Some(GuildId(guild)),
            channel_id: Some(ChannelId(channel)),
            attachments: files.iter().map(|f| attachment(f, None)).collect(),
        }
    }

    #[tokio::test]
    async fn uploads_and_replies_with_public_url() {
        let h = harness();
        let out = h
            .pipeline
            .on_message_at(&message(100, 200, &["report.pdf"]), now())
            .await;
        assert_eq!(
            out,
            PipelineOutcome::Processed {
                uploaded: 1,
                failed: 0
            }
        );

        assert_eq!(
            h.chat.sent_texts(),
            vec!["File uploaded successfully: https://cdn.example.com/documents/2025/7/report.pdf"]
        );
        assert_eq!(h.chat.sent.lock().unwrap()[0].0, ChannelId(200));
    }

    #[tokio::test]
    async fn unwatched_channel_has_no_side_effects() {
        let h = harness();
        let out = h.pipeline.on_message(&message(100, 201, &["a.png", "b.png"])).await;
        assert_eq!(out, PipelineOutcome::Ignored(IgnoreReason::Unwatched));
        assert_eq!(h.store.exists_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
        assert!(h.store.written().is_empty());
        assert!(h.chat.sent_texts().is_empty());
        assert!(!h.pipeline.presence.is_pending());
    }

    #[tokio::test]
    async fn ignores_bots_self_and_missing_context() {
        let h = harness();

        let mut own = message(100, 200, &["a.png"]);
        own.from_self = true;
        assert_eq!(
            h.pipeline.on_message(&own).await,
            PipelineOutcome::Ignored(IgnoreReason::OwnMessage)
        );

        let mut bot = message(100, 200, &["a.png"]);
        bot.author_is_bot = true;
        assert_eq!(
            h.pipeline.on_message(&bot).await,
            PipelineOutcome::Ignored(IgnoreReason::BotAuthor)
        );

        let mut dm = message(100, 200, &["a.png"]);
        dm.guild_id = None;
        assert_eq!(
            h.pipeline.on_message(&dm).await,
            PipelineOutcome::Ignored(IgnoreReason::NoGuildContext)
        );

        assert!(h.chat.sent_texts().is_empty());
        assert!(h.store.written().is_empty());
    }

    #[tokio::test]
    async fn watched_message_without_attachments_still_schedules_refresh() {
        let h = harness();
        let out = h.pipeline.on_message(&message(100, 200, &[])).await;
        assert_eq!(
            out,
            PipelineOutcome::Processed {
                uploaded: 0,
                failed: 0
            }
        );
        assert!(h.pipeline.presence.is_pending());
        assert!(h.chat.sent_texts().is_empty());
        assert!(h.store.written().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn two_uploads_schedule_one_refresh() {
        let h = harness();
        h.pipeline
            .on_message(&message(100, 200, &["a.png", "b.mp4"]))
            .await;
        assert!(h.pipeline.presence.is_pending());
        assert_eq!(h.store.list_calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(46)).await;
        assert_eq!(h.store.list_calls.load(Ordering::SeqCst), 1);
        let updates = h.chat.presence_updates();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].starts_with("Managing 2 files ("), "{}", updates[0]);
    }

    #[tokio::test]
    async fn allocation_failure_only_affects_its_attachment() {
        let h = harness();
        h.store.fail_exists_for("images/2025/7/bad.png");

        let out = h
            .pipeline
            .on_message_at(&message(100, 200, &["bad.png", "good.txt"]), now())
            .await;
        assert_eq!(
            out,
            PipelineOutcome::Processed {
                uploaded: 1,
                failed: 1
            }
        );

        let sent = h.chat.sent_texts();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].starts_with("File upload failed: "), "{}", sent[0]);
        assert_eq!(
            sent[1],
            "File uploaded successfully: https://cdn.example.com/documents/2025/7/good.txt"
        );
        assert_eq!(h.store.written().len(), 1);
    }
}
