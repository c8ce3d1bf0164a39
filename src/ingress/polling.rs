use super::telegram_client::{TelegramMessage, UpdateFeed};
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

const MAX_BACKOFF_SECS: u64 = 60;

/// Long-poll `feed` forever, handing every message (or channel post) to
/// `handle`. Polling errors back off exponentially up to a minute.
pub async fn poll_messages<F, Fut>(feed: &dyn UpdateFeed, timeout: u64, label: &str, mut handle: F)
where
    F: FnMut(TelegramMessage) -> Fut,
    Fut: Future<Output = ()>,
{
    info!("Starting Telegram long polling for {}", label);

    let mut offset: Option<i64> = None;
    let mut backoff_secs = 1;

    loop {
        match feed.get_updates(offset, timeout).await {
            Ok(updates) => {
                backoff_secs = 1;

                for update in updates {
                    offset = Some(update.update_id + 1);
                    if let Some(message) = update.into_message() {
                        handle(message).await;
                    }
                }
            }
            Err(e) => {
                warn!(
                    "Telegram polling error ({}): {}. Retrying in {}s...",
                    label, e, backoff_secs
                );
                sleep(Duration::from_secs(backoff_secs)).await;
                backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
            }
        }
    }
}
