//! In-memory fakes of the ports, shared by unit tests.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    domain::{Attachment, ChannelId},
    errors::Error,
    ports::{AttachmentFetcher, ChatPort, ObjectPage, ObjectStore, ObjectSummary, PutObject},
    Result,
};

#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<BTreeMap<String, PutObject>>,
    pub sizes: Mutex<BTreeMap<String, u64>>,
    pub fail_exists: Mutex<HashSet<String>>,
    pub fail_list: Mutex<bool>,
    pub page_size: usize,
    pub exists_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            page_size: 1000,
            ..Self::default()
        }
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    pub fn seed(&self, key: &str, size: u64) {
        self.sizes.lock().unwrap().insert(key.to_string(), size);
    }

    pub fn fail_exists_for(&self, key: &str) {
        self.fail_exists.lock().unwrap().insert(key.to_string());
    }

    pub fn written(&self) -> Vec<PutObject> {
        self.objects.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exists.lock().unwrap().contains(key) {
            return Err(Error::Store("403 Forbidden".to_string()));
        }
        Ok(self.sizes.lock().unwrap().contains_key(key))
    }

    async fn put_object(&self, req: PutObject) -> Result<()> {
        self.sizes
            .lock()
            .unwrap()
            .insert(req.key.clone(), req.body.len() as u64);
        self.objects.lock().unwrap().insert(req.key.clone(), req);
        Ok(())
    }

    async fn list_page(&self, continuation: Option<String>) -> Result<ObjectPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_list.lock().unwrap() {
            return Err(Error::Store("listing denied".to_string()));
        }
        let sizes = self.sizes.lock().unwrap();
        let start = continuation
            .as_deref()
            .map(|c| c.parse::<usize>().unwrap())
            .unwrap_or(0);
        let objects: Vec<ObjectSummary> = sizes
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|(key, size)| ObjectSummary {
                key: key.clone(),
                size: *size,
            })
            .collect();
        let end = start + objects.len();
        let next = (end < sizes.len()).then(|| end.to_string());
        Ok(ObjectPage { objects, next })
    }
}

#[derive(Default)]
pub struct RecordingChat {
    pub sent: Mutex<Vec<(ChannelId, String)>>,
    pub presence: Mutex<Vec<String>>,
    pub fail_presence: Mutex<bool>,
}

impl RecordingChat {
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn presence_updates(&self) -> Vec<String> {
        self.presence.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatPort for RecordingChat {
    async fn send_text(&self, channel: ChannelId, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((channel, text.to_string()));
        Ok(())
    }

    async fn set_presence(&self, text: &str) -> Result<()> {
        if *self.fail_presence.lock().unwrap() {
            return Err(Error::Chat("gateway closed".to_string()));
        }
        self.presence.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Returns the URL bytes as the body; fails for URLs containing `broken`.
#[derive(Default)]
pub struct EchoFetcher {
    pub calls: AtomicUsize,
}

#[async_trait]
impl AttachmentFetcher for EchoFetcher {
    async fn fetch(&self, attachment: &Attachment) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if attachment.url.contains("broken") {
            return Err(Error::Fetch(format!("404 for {}", attachment.url)));
        }
        Ok(attachment.url.as_bytes().to_vec())
    }
}

pub fn attachment(filename: &str, content_type: Option<&str>) -> Attachment {
    Attachment {
        filename: filename.to_string(),
        content_type: content_type.map(str::to_string),
        size: 0,
        url: format!("https://cdn.discordapp.com/attachments/1/2/{filename}"),
    }
}
