use super::caption::caption_for;
use super::delivery::{delivery_method, DeliveryMethod};
use super::destinations::DestinationSet;
use crate::error::RelayError;
use crate::staging::{self, StagedFile};
use async_trait::async_trait;
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Bot account side of the bridge. Every call may fail on its own.
#[async_trait]
pub trait BotSender: Send + Sync {
    async fn send_photo(&self, chat_id: &str, path: &Path, caption: &str) -> Result<(), RelayError>;
    async fn send_video(&self, chat_id: &str, path: &Path, caption: &str) -> Result<(), RelayError>;
    async fn send_audio(&self, chat_id: &str, path: &Path, caption: &str) -> Result<(), RelayError>;
    async fn send_document(&self, chat_id: &str, path: &Path, caption: &str)
        -> Result<(), RelayError>;
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), RelayError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub destination: String,
    pub success: bool,
    pub error_detail: Option<String>,
}

#[derive(Debug)]
pub struct RelayReport {
    pub file: StagedFile,
    pub method: DeliveryMethod,
    pub outcomes: Vec<DeliveryOutcome>,
    /// Whether the staged file was removed afterwards.
    pub cleaned: bool,
}

impl RelayReport {
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }
}

/// Sends one staged file to every destination at once, waits for all of
/// them to settle and then deletes the file, whatever the outcomes.
pub struct FanoutRelay {
    sender: Arc<dyn BotSender>,
    destinations: Arc<DestinationSet>,
}

impl FanoutRelay {
    pub fn new(sender: Arc<dyn BotSender>, destinations: Arc<DestinationSet>) -> Self {
        Self {
            sender,
            destinations,
        }
    }

    pub fn destinations(&self) -> &DestinationSet {
        &self.destinations
    }

    pub async fn relay(&self, file: StagedFile) -> RelayReport {
        let name = file.file_name();
        let caption = caption_for(&file);
        let method = delivery_method(&file.extension);

        if self.destinations.is_empty() {
            warn!("No destination chats configured, dropping {}", name);
        }

        let sends = self
            .destinations
            .iter()
            .map(|chat_id| self.deliver(chat_id, &file.path, &name, method, &caption));
        let outcomes = join_all(sends).await;

        let delivered = outcomes.iter().filter(|o| o.success).count();
        info!(
            "Relayed {} as {:?} to {}/{} chats",
            name,
            method,
            delivered,
            outcomes.len()
        );

        let cleaned = staging::cleanup(&file.path).await;

        RelayReport {
            file,
            method,
            outcomes,
            cleaned,
        }
    }

    async fn deliver(
        &self,
        chat_id: &str,
        path: &Path,
        name: &str,
        method: DeliveryMethod,
        caption: &str,
    ) -> DeliveryOutcome {
        let result = match method {
            DeliveryMethod::Image => self.sender.send_photo(chat_id, path, caption).await,
            DeliveryMethod::Video => self.sender.send_video(chat_id, path, caption).await,
            DeliveryMethod::Audio => self.sender.send_audio(chat_id, path, caption).await,
            DeliveryMethod::Generic => self.sender.send_document(chat_id, path, caption).await,
        };

        match result {
            Ok(()) => {
                info!("Success: sent file {} to chat {}", name, chat_id);
                DeliveryOutcome {
                    destination: chat_id.to_string(),
                    success: true,
                    error_detail: None,
                }
            }
            Err(e) => {
                if e.is_rate_limit() {
                    warn!("Rate limited by Telegram while sending to {}", chat_id);
                }
                let err = RelayError::Delivery {
                    chat_id: chat_id.to_string(),
                    reason: e.to_string(),
                };
                error!("Failed: sending file {}: {}", name, err);
                DeliveryOutcome {
                    destination: chat_id.to_string(),
                    success: false,
                    error_detail: Some(e.to_string()),
                }
            }
        }
    }
}
