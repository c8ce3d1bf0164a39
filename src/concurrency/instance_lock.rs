//! Cross-process guard on the staging directory using advisory file locking
//! (fs2 flock).
//!
//! Two bridges sharing one staging directory would purge each other's files
//! at startup, so only one process may own a directory at a time.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Advisory lock for one staging directory.
///
/// The lock file sits next to the directory (`<dir>.lock`), never inside it,
/// so the startup purge and the watcher do not see it.
#[derive(Debug, Clone)]
pub struct InstanceLock {
    path: PathBuf,
    pid_path: PathBuf,
}

/// RAII guard that releases the lock on drop.
pub struct InstanceLockGuard {
    file: File,
    pid_path: PathBuf,
}

impl Drop for InstanceLockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        // Best effort cleanup of PID file
        let _ = fs::remove_file(&self.pid_path);
    }
}

impl InstanceLock {
    pub fn for_staging_dir(dir: &Path) -> Result<Self> {
        let path = sibling(dir, ".lock")?;
        let pid_path = sibling(dir, ".lock.pid")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        Ok(Self { path, pid_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking try-acquire; returns `None` if another process holds it.
    pub fn try_acquire(&self) -> Result<Option<InstanceLockGuard>> {
        let file = File::create(&self.path)?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                let _ = fs::write(&self.pid_path, std::process::id().to_string());
                Ok(Some(InstanceLockGuard {
                    file,
                    pid_path: self.pid_path.clone(),
                }))
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            #[cfg(unix)]
            Err(ref e) if e.raw_os_error() == Some(35) || e.raw_os_error() == Some(11) => {
                // EAGAIN(11) / EWOULDBLOCK(35 on macOS): lock contention
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Acquire or fail with the owner's PID when it is known.
    pub fn acquire(&self) -> Result<InstanceLockGuard> {
        match self.try_acquire()? {
            Some(guard) => Ok(guard),
            None => {
                let owner = fs::read_to_string(&self.pid_path)
                    .map(|pid| format!(" (PID {})", pid.trim()))
                    .unwrap_or_default();
                anyhow::bail!(
                    "Another media-relay instance{} holds {}",
                    owner,
                    self.path.display()
                )
            }
        }
    }
}

/// `dir` with `suffix` appended to its last component. `.` and `..` are
/// resolved first so the result never points back into the directory.
fn sibling(dir: &Path, suffix: &str) -> Result<PathBuf> {
    let dir = match dir.file_name() {
        Some(_) => dir.to_path_buf(),
        None => dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve staging directory {}", dir.display()))?,
    };
    let mut name = dir
        .file_name()
        .with_context(|| format!("Staging directory {} has no name", dir.display()))?
        .to_os_string();
    name.push(suffix);
    Ok(dir.with_file_name(name))
}
