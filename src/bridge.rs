//! Wires ingestion, staging and relay together.

use crate::config::{StartupPolicy, WatchMode};
use crate::ingress::{BlockList, IngestionSink, MediaSource, SenderFilter};
use crate::relay::{
    staging_queue, BotSender, DestinationSet, DirectoryWatcher, FanoutRelay, FilesystemWatch,
};
use crate::staging::{StagedFile, StagingDir};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Clone)]
pub struct BridgeOptions {
    pub watch_mode: WatchMode,
    pub startup_policy: StartupPolicy,
    pub queue_capacity: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            watch_mode: WatchMode::Channel,
            startup_policy: StartupPolicy::Purge,
            queue_capacity: 256,
        }
    }
}

pub struct Bridge {
    staging: StagingDir,
    relay: Arc<FanoutRelay>,
    sink: Arc<IngestionSink>,
    options: BridgeOptions,
    queue_tx: Sender<StagedFile>,
    queue_rx: Receiver<StagedFile>,
}

/// Running watcher side of the bridge.
pub struct BridgeHandle {
    pub watcher: JoinHandle<()>,
    /// Kept alive for as long as the bridge runs in filesystem mode.
    pub fs_watch: Option<FilesystemWatch>,
}

impl Bridge {
    pub fn new(
        staging: StagingDir,
        source: Arc<dyn MediaSource>,
        sender: Arc<dyn BotSender>,
        destinations: DestinationSet,
        block_list: BlockList,
        options: BridgeOptions,
    ) -> Self {
        let (queue_tx, queue_rx) = staging_queue(options.queue_capacity);

        // Staged files are linked into place, which the filesystem watch does
        // not report, so the sink queues its own files in both modes.
        let sink = IngestionSink::new(source, SenderFilter::new(block_list), staging.clone())
            .with_queue(queue_tx.clone());

        let relay = FanoutRelay::new(sender, Arc::new(destinations));

        Self {
            staging,
            relay: Arc::new(relay),
            sink: Arc::new(sink),
            options,
            queue_tx,
            queue_rx,
        }
    }

    pub fn sink(&self) -> Arc<IngestionSink> {
        self.sink.clone()
    }

    pub fn relay(&self) -> Arc<FanoutRelay> {
        self.relay.clone()
    }

    pub fn staging(&self) -> &StagingDir {
        &self.staging
    }

    /// Create the staging directory and deal with files left by a previous
    /// run according to the startup policy. Must complete before [`start`].
    ///
    /// [`start`]: Bridge::start
    pub async fn prepare(&self) -> Result<usize> {
        self.staging.ensure().await.with_context(|| {
            format!(
                "Failed to create staging directory {}",
                self.staging.path().display()
            )
        })?;

        match self.options.startup_policy {
            StartupPolicy::Purge => {
                let removed = self.staging.purge().await?;
                info!("Startup purge removed {} leftover file(s)", removed);
                Ok(removed)
            }
            StartupPolicy::Relay => {
                let leftovers = self.staging.staged_files().await?;
                let count = leftovers.len();
                info!("Relaying {} leftover file(s) from a previous run", count);
                join_all(leftovers.into_iter().map(|file| self.relay.relay(file))).await;
                // Hidden partial writes are never relayed.
                self.staging.purge().await?;
                Ok(count)
            }
        }
    }

    /// Start observing newly staged files.
    pub fn start(self) -> Result<BridgeHandle> {
        let fs_watch = match self.options.watch_mode {
            WatchMode::Channel => None,
            WatchMode::Filesystem => Some(FilesystemWatch::start(
                self.staging.path(),
                self.queue_tx.clone(),
            )?),
        };

        // The sink (and the filesystem watch, if any) hold the remaining
        // senders; once they are gone the watcher drains the queue and stops.
        drop(self.queue_tx);

        let watcher = DirectoryWatcher::new(self.relay).spawn(self.queue_rx);
        Ok(BridgeHandle { watcher, fs_watch })
    }
}
