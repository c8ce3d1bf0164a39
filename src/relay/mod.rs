pub mod caption;
pub mod delivery;
pub mod destinations;
pub mod fanout;
pub mod watcher;

pub use caption::caption_for;
pub use delivery::{delivery_method, DeliveryMethod};
pub use destinations::DestinationSet;
pub use fanout::{BotSender, DeliveryOutcome, FanoutRelay, RelayReport};
pub use watcher::{staging_queue, DirectoryWatcher, FilesystemWatch};
