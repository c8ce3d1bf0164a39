//! Notices newly staged files and fires one relay per file.
//!
//! Ingestion hands staged files over through a bounded in-process queue.
//! [`FilesystemWatch`] feeds the same queue from filesystem events, for setups
//! where something outside this process drops files into the staging
//! directory.

use super::fanout::FanoutRelay;
use crate::staging::StagedFile;
use anyhow::Result;
use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Bounded queue of staged files waiting for relay.
pub fn staging_queue(capacity: usize) -> (Sender<StagedFile>, Receiver<StagedFile>) {
    mpsc::channel(capacity.max(1))
}

pub struct DirectoryWatcher {
    relay: Arc<FanoutRelay>,
}

impl DirectoryWatcher {
    pub fn new(relay: Arc<FanoutRelay>) -> Self {
        Self { relay }
    }

    /// Consume the queue until every sender is dropped.
    ///
    /// Each file is relayed on its own task; the loop never waits for a
    /// relay to finish, so several files can be in flight at once.
    pub async fn run(self, mut queue: Receiver<StagedFile>) {
        info!("Watching for staged files");

        while let Some(file) = queue.recv().await {
            if file.is_hidden() {
                debug!("Ignoring hidden file {}", file.path.display());
                continue;
            }
            info!("New file detected: {}", file.path.display());

            let relay = self.relay.clone();
            tokio::spawn(async move {
                relay.relay(file).await;
            });
        }

        info!("Staging queue closed, watcher stopped");
    }

    pub fn spawn(self, queue: Receiver<StagedFile>) -> JoinHandle<()> {
        tokio::spawn(self.run(queue))
    }
}

/// Completed files in the staging directory, forwarded to the staging queue.
/// Dropping it stops the watch.
pub struct FilesystemWatch {
    #[allow(dead_code)]
    watcher: RecommendedWatcher,
}

impl FilesystemWatch {
    pub fn start(dir: &Path, queue: Sender<StagedFile>) -> Result<Self> {
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    for path in completed_paths(event) {
                        let file = StagedFile::from_path(path);
                        if file.is_hidden() {
                            continue;
                        }
                        if let Err(e) = queue.blocking_send(file) {
                            warn!("Failed to queue staged file: {}", e);
                        }
                    }
                }
                Err(e) => warn!("Watch error: {:?}", e),
            }
        })?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        info!("Watching staging directory: {}", dir.display());

        Ok(Self { watcher })
    }
}

/// Paths whose content is final: a writer closed the file, or it was renamed
/// into the directory.
///
/// Creation is not enough, it is reported as soon as the writer opens the
/// file. Closing needs inotify's close-write notification, so on other
/// platforms only files moved into the directory are picked up. A rename is
/// reported as `To` and again as `Both`; only `To` is taken so each file
/// fires once.
fn completed_paths(event: Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Access(AccessKind::Close(AccessMode::Write))
        | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, RemoveKind};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for p in paths {
            event = event.add_path(PathBuf::from(p));
        }
        event
    }

    #[test]
    fn closed_writes_and_renames_count_as_new_files() {
        let closed = completed_paths(event(
            EventKind::Access(AccessKind::Close(AccessMode::Write)),
            &["/s/1_media_1.jpg"],
        ));
        assert_eq!(closed, vec![PathBuf::from("/s/1_media_1.jpg")]);

        let renamed = completed_paths(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/s/1_media_1.jpg"],
        ));
        assert_eq!(renamed, vec![PathBuf::from("/s/1_media_1.jpg")]);
    }

    #[test]
    fn file_still_being_written_is_not_taken() {
        let created = completed_paths(event(EventKind::Create(CreateKind::File), &["/s/1_media_1.jpg"]));
        assert!(created.is_empty());

        let read = completed_paths(event(
            EventKind::Access(AccessKind::Close(AccessMode::Read)),
            &["/s/1_media_1.jpg"],
        ));
        assert!(read.is_empty());
    }

    #[test]
    fn paired_rename_event_is_not_counted_twice() {
        let both = completed_paths(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/s/.1_media_1.jpg.part", "/s/1_media_1.jpg"],
        ));
        assert!(both.is_empty());
    }

    #[test]
    fn removals_are_ignored() {
        let removed = completed_paths(event(EventKind::Remove(RemoveKind::File), &["/s/1_media_1.jpg"]));
        assert!(removed.is_empty());
    }

    #[tokio::test]
    async fn queue_capacity_is_at_least_one() {
        let (tx, mut rx) = staging_queue(0);
        tx.send(StagedFile::from_path("/s/1_media_1.jpg")).await.unwrap();
        assert!(rx.recv().await.is_some());
    }
}
