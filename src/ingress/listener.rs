use super::polling::poll_messages;
use super::sink::IngestionSink;
use super::telegram_client::{TelegramMessage, UpdateFeed};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Listens to the source account and feeds every message to the ingestion
/// sink. Each message is handled on its own task so a slow download never
/// holds up the next update.
pub struct SourceListener {
    feed: Arc<dyn UpdateFeed>,
    sink: Arc<IngestionSink>,
    poll_timeout: u64,
}

impl SourceListener {
    pub fn new(feed: Arc<dyn UpdateFeed>, sink: Arc<IngestionSink>, poll_timeout: u64) -> Self {
        Self {
            feed,
            sink,
            poll_timeout,
        }
    }

    pub async fn run(&self) {
        poll_messages(self.feed.as_ref(), self.poll_timeout, "source account", |message| {
            self.dispatch(message);
            async {}
        })
        .await
    }

    pub fn dispatch(&self, message: TelegramMessage) -> JoinHandle<()> {
        let event = message.to_media_event();
        debug!("Inbound {}", event);
        let sink = self.sink.clone();
        tokio::spawn(async move {
            sink.handle(event).await;
        })
    }
}
