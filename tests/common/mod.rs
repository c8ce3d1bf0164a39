// Shared mock Telegram collaborators for integration tests.
#![allow(dead_code)]

use media_relay::ingress::{MediaRef, MediaSource, TelegramUpdate, UpdateFeed};
use media_relay::relay::{BotSender, DeliveryMethod};
use media_relay::RelayError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

/// Source account returning fixed bytes; file ids listed in `failing` error.
pub struct MockSource {
    pub content: Vec<u8>,
    pub failing: HashSet<String>,
    pub downloads: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new(content: &[u8]) -> Self {
        Self {
            content: content.to_vec(),
            failing: HashSet::new(),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, file_id: &str) -> Self {
        self.failing.insert(file_id.to_string());
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl MediaSource for MockSource {
    async fn download_media(&self, media: &MediaRef) -> Result<Vec<u8>, RelayError> {
        self.downloads.lock().unwrap().push(media.file_id.clone());
        if self.failing.contains(&media.file_id) {
            return Err(RelayError::Download {
                file_id: media.file_id.clone(),
                reason: "connection reset".to_string(),
            });
        }
        Ok(self.content.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentFile {
    pub method: DeliveryMethod,
    pub chat_id: String,
    pub path: PathBuf,
    pub caption: String,
    /// Whether the staged file still existed when the send started
    pub existed: bool,
    /// File size when the send started
    pub size: Option<u64>,
}

/// Bot account recording every call; chats listed in `failing` error.
#[derive(Default)]
pub struct RecordingSender {
    pub failing: HashSet<String>,
    pub sent: Mutex<Vec<SentFile>>,
    pub messages: Mutex<Vec<(String, String)>>,
    /// When set, every send waits here, so all sends must be in flight at once.
    pub barrier: Option<Arc<Barrier>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, chat_id: &str) -> Self {
        self.failing.insert(chat_id.to_string());
        self
    }

    pub fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn sent(&self) -> Vec<SentFile> {
        self.sent.lock().unwrap().clone()
    }

    async fn record(
        &self,
        method: DeliveryMethod,
        chat_id: &str,
        path: &Path,
        caption: &str,
    ) -> Result<(), RelayError> {
        self.sent.lock().unwrap().push(SentFile {
            method,
            chat_id: chat_id.to_string(),
            path: path.to_path_buf(),
            caption: caption.to_string(),
            existed: path.exists(),
            size: std::fs::metadata(path).map(|m| m.len()).ok(),
        });
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.failing.contains(chat_id) {
            return Err(RelayError::telegram("send", "Forbidden: bot was kicked"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl BotSender for RecordingSender {
    async fn send_photo(&self, chat_id: &str, path: &Path, caption: &str) -> Result<(), RelayError> {
        self.record(DeliveryMethod::Image, chat_id, path, caption).await
    }

    async fn send_video(&self, chat_id: &str, path: &Path, caption: &str) -> Result<(), RelayError> {
        self.record(DeliveryMethod::Video, chat_id, path, caption).await
    }

    async fn send_audio(&self, chat_id: &str, path: &Path, caption: &str) -> Result<(), RelayError> {
        self.record(DeliveryMethod::Audio, chat_id, path, caption).await
    }

    async fn send_document(
        &self,
        chat_id: &str,
        path: &Path,
        caption: &str,
    ) -> Result<(), RelayError> {
        self.record(DeliveryMethod::Generic, chat_id, path, caption).await
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), RelayError> {
        self.messages
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Update feed that serves one batch and then stays silent.
pub struct OneShotFeed {
    pub batch: Mutex<Option<Vec<TelegramUpdate>>>,
}

impl OneShotFeed {
    pub fn new(updates: Vec<TelegramUpdate>) -> Self {
        Self {
            batch: Mutex::new(Some(updates)),
        }
    }
}

#[async_trait::async_trait]
impl UpdateFeed for OneShotFeed {
    async fn get_updates(
        &self,
        _offset: Option<i64>,
        _timeout: u64,
    ) -> Result<Vec<TelegramUpdate>, RelayError> {
        let batch = self.batch.lock().unwrap().take();
        match batch {
            Some(updates) => Ok(updates),
            None => {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(Vec::new())
            }
        }
    }
}

/// Poll `check` until it holds or five seconds pass.
pub async fn wait_until<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..250 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
