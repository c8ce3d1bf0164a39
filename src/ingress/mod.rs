pub mod classify;
pub mod filter;
pub mod listener;
pub mod polling;
pub mod sink;
pub mod telegram_client;
pub mod types;

pub use classify::classify;
pub use filter::{BlockList, SenderFilter};
pub use listener::SourceListener;
pub use sink::{IngestOutcome, IngestionSink, MediaSource};
pub use telegram_client::{
    TelegramChat, TelegramClient, TelegramMessage, TelegramUpdate, TelegramUser, UpdateFeed,
};
pub use types::{InboundMediaEvent, MediaKind, MediaRef, UNKNOWN_SENDER};
