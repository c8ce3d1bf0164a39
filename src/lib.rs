//! One-way Telegram media bridge.
//!
//! Media arriving in a source account is staged on disk, fanned out by a bot
//! account to a fixed set of chats, and deleted once every delivery settled.

pub mod bridge;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod ingress;
pub mod relay;
pub mod server;
pub mod staging;

pub use bridge::{Bridge, BridgeHandle, BridgeOptions};
pub use error::RelayError;
