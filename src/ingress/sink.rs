use super::classify::classify;
use super::filter::SenderFilter;
use super::types::{InboundMediaEvent, MediaRef};
use crate::error::RelayError;
use crate::staging::{staged_file_name, StagedFile, StagingDir};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tracing::{debug, error, info, warn};

/// Source account side of the bridge: fetches media payloads.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn download_media(&self, media: &MediaRef) -> Result<Vec<u8>, RelayError>;
}

/// What happened to one inbound event.
#[derive(Debug)]
pub enum IngestOutcome {
    Staged(StagedFile),
    NoMedia,
    Blocked,
    DownloadFailed(RelayError),
    WriteFailed(RelayError),
}

impl IngestOutcome {
    pub fn staged(&self) -> Option<&StagedFile> {
        match self {
            IngestOutcome::Staged(file) => Some(file),
            _ => None,
        }
    }
}

/// Turns inbound media events into staged files.
///
/// With a queue attached, every staged file is also handed straight to the
/// relay dispatcher; without one it stays staged until the next startup.
pub struct IngestionSink {
    source: Arc<dyn MediaSource>,
    filter: SenderFilter,
    staging: StagingDir,
    queue: Option<Sender<StagedFile>>,
}

impl IngestionSink {
    pub fn new(source: Arc<dyn MediaSource>, filter: SenderFilter, staging: StagingDir) -> Self {
        Self {
            source,
            filter,
            staging,
            queue: None,
        }
    }

    pub fn with_queue(mut self, queue: Sender<StagedFile>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Process one event. Errors are logged and reported in the outcome, never
    /// propagated, so the listener keeps running.
    pub async fn handle(&self, event: InboundMediaEvent) -> IngestOutcome {
        let media = match &event.media {
            Some(media) => media,
            None => {
                debug!("Ignoring {}: no media payload", event);
                return IngestOutcome::NoMedia;
            }
        };

        if self.filter.is_blocked(&event.sender_id) {
            info!("Ignoring media from blocked sender {}", event.sender_id);
            return IngestOutcome::Blocked;
        }

        let bytes = match self.source.download_media(media).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to download media for {}: {}", event, e);
                return IngestOutcome::DownloadFailed(e);
            }
        };

        let extension = classify(event.media_kind, event.mime_type.as_deref());
        let name = staged_file_name(&event.sender_id, event.message_id, extension);

        let staged = match self.staging.write(&name, &bytes).await {
            Ok(staged) => staged,
            Err(e) => {
                error!("Failed to stage media for {}: {}", event, e);
                return IngestOutcome::WriteFailed(e);
            }
        };
        info!("Media saved to {}", staged.path.display());

        if let Some(queue) = &self.queue {
            if let Err(e) = queue.send(staged.clone()).await {
                warn!(
                    "Relay queue closed, {} stays staged until next startup: {}",
                    staged.path.display(),
                    e
                );
            }
        }

        IngestOutcome::Staged(staged)
    }
}
