use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use media_relay::concurrency::InstanceLock;
use media_relay::config::{Config, StartupPolicy, WatchMode};
use media_relay::ingress::{SourceListener, TelegramClient};
use media_relay::server::CommandService;
use media_relay::staging::StagingDir;
use media_relay::{Bridge, BridgeOptions};

#[derive(Args)]
pub struct RunArgs {
    /// Also relay files other processes write into the staging directory
    #[arg(long)]
    pub watch_filesystem: bool,

    /// Relay files left over from a previous run instead of deleting them
    #[arg(long)]
    pub relay_leftovers: bool,

    /// Do not answer /start on the bot account
    #[arg(long)]
    pub no_commands: bool,
}

pub async fn run(args: RunArgs, mut config: Config) -> Result<()> {
    if args.watch_filesystem {
        config.relay.watch_mode = WatchMode::Filesystem;
    }
    if args.relay_leftovers {
        config.staging.startup_policy = StartupPolicy::Relay;
    }
    if args.no_commands {
        config.bot.commands_enabled = false;
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    let staging_path = config.staging_path();
    let _lock = InstanceLock::for_staging_dir(&staging_path)?.acquire()?;

    let timeout = Duration::from_secs(config.http.timeout_secs);
    let bot = Arc::new(TelegramClient::with_options(
        config.bot.token.clone(),
        &config.bot.api_base,
        timeout,
    )?);
    let source = Arc::new(TelegramClient::with_options(
        config.source.token.clone(),
        &config.source.api_base,
        timeout,
    )?);

    let destinations = config.destination_set();
    if destinations.is_empty() {
        warn!("No destination chats configured; staged files will only be deleted");
    }
    let block_list = config.block_list();
    info!(
        "Relaying to {} chat(s), {} blocked sender(s), staging in {}",
        destinations.len(),
        block_list.len(),
        staging_path.display()
    );

    let bridge = Bridge::new(
        StagingDir::new(&staging_path),
        source.clone(),
        bot.clone(),
        destinations,
        block_list,
        BridgeOptions {
            watch_mode: config.relay.watch_mode,
            startup_policy: config.staging.startup_policy,
            queue_capacity: config.relay.queue_capacity,
        },
    );

    bridge.prepare().await?;
    let sink = bridge.sink();
    let handle = bridge.start()?;

    let listener = SourceListener::new(source, sink, config.source.poll_timeout);
    let listener_task = tokio::spawn(async move { listener.run().await });

    let commands_task = if config.bot.commands_enabled {
        let service = CommandService::new(bot.clone(), bot, config.bot.poll_timeout);
        Some(tokio::spawn(async move { service.run().await }))
    } else {
        None
    };

    info!("Bridge is running. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    listener_task.abort();
    if let Some(task) = commands_task {
        task.abort();
    }
    handle.watcher.abort();
    drop(handle.fs_watch);

    Ok(())
}
