//! Staging directory: the on-disk handoff between ingestion and relay.
//!
//! Files are written once by the ingestion sink, read once by the fan-out
//! relay and deleted once by [`cleanup`]. At startup every leftover entry is
//! purged (or relayed, depending on the configured startup policy).

mod file;

pub use file::{extract_prefix, staged_file_name, StagedFile, UNKNOWN_PREFIX};

use crate::error::RelayError;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct StagingDir {
    root: PathBuf,
}

impl StagingDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the directory (and parents) if it does not exist yet.
    pub async fn ensure(&self) -> std::io::Result<()> {
        if !tokio::fs::try_exists(&self.root).await.unwrap_or(false) {
            warn!(
                "Staging directory {} does not exist, creating it",
                self.root.display()
            );
        }
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Write `bytes` under `name`.
    ///
    /// The payload goes to a hidden `.part` file first and is then linked
    /// into place, so a watcher never observes a half-written file. An
    /// existing file of the same name is never replaced: the write fails with
    /// `AlreadyExists` instead.
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<StagedFile, RelayError> {
        let path = self.root.join(name);
        let partial = self.root.join(format!(".{}.part", name));

        if let Err(source) = tokio::fs::write(&partial, bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(RelayError::Write { path, source });
        }
        let linked = tokio::fs::hard_link(&partial, &path).await;
        let _ = tokio::fs::remove_file(&partial).await;
        if let Err(source) = linked {
            if source.kind() == std::io::ErrorKind::AlreadyExists {
                warn!("{} is already staged, dropping the new payload", path.display());
            }
            return Err(RelayError::Write { path, source });
        }

        debug!("Staged {} ({} bytes)", path.display(), bytes.len());
        Ok(StagedFile::from_path(path))
    }

    /// Visible regular files currently staged.
    pub async fn staged_files(&self) -> std::io::Result<Vec<StagedFile>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            let file = StagedFile::from_path(entry.path());
            if is_file && !file.is_hidden() {
                files.push(file);
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Delete every pre-existing entry, hidden partial writes included.
    ///
    /// Returns the number of files removed. Failures are logged per entry.
    pub async fn purge(&self) -> Result<usize, RelayError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut count = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                warn!("Skipping directory in staging area: {}", path.display());
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    info!("Deleted old file: {}", path.display());
                    count += 1;
                }
                Err(e) => error!("Error deleting file {}: {}", path.display(), e),
            }
        }

        Ok(count)
    }
}

/// Remove a staged file after its fan-out has settled.
///
/// Never fails towards the caller: a missing file or a permission problem is
/// logged and reported as `false`. Whatever survives is purged on the next
/// startup.
pub async fn cleanup(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!("File deleted: {}", path.display());
            true
        }
        Err(source) => {
            let err = RelayError::Cleanup {
                path: path.to_path_buf(),
                source,
            };
            error!("{}", err);
            false
        }
    }
}
