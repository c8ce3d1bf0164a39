use crate::ingress::polling::poll_messages;
use crate::ingress::{TelegramChat, TelegramMessage, UpdateFeed};
use crate::relay::caption::escape_code;
use crate::relay::BotSender;
use std::sync::Arc;
use tracing::{info, warn};

/// Answers `/start` on the bot account with the chat's own id, so operators
/// can find the ids to put in the destination list.
pub struct CommandService {
    feed: Arc<dyn UpdateFeed>,
    sender: Arc<dyn BotSender>,
    poll_timeout: u64,
}

impl CommandService {
    pub fn new(feed: Arc<dyn UpdateFeed>, sender: Arc<dyn BotSender>, poll_timeout: u64) -> Self {
        Self {
            feed,
            sender,
            poll_timeout,
        }
    }

    pub async fn run(&self) {
        poll_messages(self.feed.as_ref(), self.poll_timeout, "bot commands", |message| async move {
            self.handle_message(message).await;
        })
        .await
    }

    /// Returns whether a reply was sent.
    pub async fn handle_message(&self, message: TelegramMessage) -> bool {
        if !is_start_command(message.text.as_deref()) {
            return false;
        }
        let Some(reply) = chat_id_reply(&message.chat) else {
            return false;
        };

        let chat_id = message.chat.id.to_string();
        match self.sender.send_message(&chat_id, &reply).await {
            Ok(()) => {
                info!("Sent chat id to {} chat {}", message.chat.kind, chat_id);
                true
            }
            Err(e) => {
                warn!("Failed to send chat id to {}: {}", chat_id, e);
                false
            }
        }
    }
}

/// `/start`, `/start@SomeBot` and `/start payload` all count.
fn is_start_command(text: Option<&str>) -> bool {
    text.and_then(|t| t.split_whitespace().next())
        .map(|cmd| cmd == "/start" || cmd.starts_with("/start@"))
        .unwrap_or(false)
}

/// MarkdownV2 reply for private chats and groups; other chat types get none.
pub fn chat_id_reply(chat: &TelegramChat) -> Option<String> {
    let id = escape_code(&chat.id.to_string());
    match chat.kind.as_str() {
        "private" => Some(format!("Your Chat ID: `{}`", id)),
        "group" | "supergroup" => Some(format!("This Group's Chat ID: `{}`", id)),
        _ => None,
    }
}
