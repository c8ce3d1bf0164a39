pub mod config;
pub mod purge;
pub mod run;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "media-relay")]
#[command(author, version, about = "Relay media from a Telegram account to a set of chats")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(short, long, global = true, env = "MEDIA_RELAY_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bridge until interrupted
    Run(run::RunArgs),

    /// Delete everything in the staging directory
    Purge,

    /// Configuration management
    Config(config::ConfigArgs),
}
