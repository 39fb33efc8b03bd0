use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::process::Command;

use crate::config::SnapshotConfig;
use crate::error::{RepoLensError, Result};
use crate::reference::RepositoryRef;

/// Distinguishes checkouts created within the same millisecond.
static CHECKOUT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Ephemeral local copy of a repository.
///
/// The snapshot owns its root directory and removes it when released or
/// dropped, whichever comes first. Removal failures are logged and ignored.
#[derive(Debug)]
pub struct Snapshot {
    root: PathBuf,
    released: bool,
}

impl Snapshot {
    /// Takes ownership of an existing directory.
    pub fn adopt(root: PathBuf) -> Self {
        Self {
            root,
            released: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Removes the snapshot directory.
    pub fn release(mut self) {
        self.remove();
    }

    /// Removes the snapshot directory on the blocking thread pool.
    ///
    /// A large checkout can take a while to delete; this keeps the removal off
    /// the async worker. `Drop` remains the fallback on early returns.
    pub async fn release_blocking(self) {
        if let Err(e) = tokio::task::spawn_blocking(move || self.release()).await {
            warn!("Snapshot removal task failed: {e}");
        }
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => debug!("Removed snapshot {}", self.root.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove snapshot {}: {e}", self.root.display()),
        }
    }
}

impl Drop for Snapshot {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Produces local snapshots of remote repositories.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Creates a complete snapshot of `repo`.
    ///
    /// # Errors
    ///
    /// Returns `CloneFailed` when no usable snapshot could be produced. No
    /// directory is left behind in that case.
    async fn acquire(&self, repo: &RepositoryRef) -> Result<Snapshot>;
}

/// Clones repositories with the `git` executable.
pub struct GitCloner {
    git_binary: String,
    web_url: String,
    checkout_parent: PathBuf,
    timeout: Duration,
}

impl GitCloner {
    pub fn new(config: &SnapshotConfig, web_url: &str) -> Self {
        Self {
            git_binary: config.git_binary.clone(),
            web_url: web_url.to_string(),
            checkout_parent: config
                .checkout_parent
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            timeout: config.clone_timeout(),
        }
    }

    /// Unique checkout directory for one clone of `repo`.
    fn checkout_path(&self, repo: &RepositoryRef) -> PathBuf {
        let sequence = CHECKOUT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        self.checkout_parent.join(format!(
            "repolens-{}-{}-{}-{sequence}",
            repo.owner,
            repo.name,
            Utc::now().timestamp_millis()
        ))
    }

    async fn run_clone(&self, url: &str, destination: &Path) -> std::result::Result<(), String> {
        let mut command = Command::new(&self.git_binary);
        command
            .args(["clone", "--depth", "1", "--single-branch", "--quiet", url])
            .arg(destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let status = tokio::time::timeout(self.timeout, command.status())
            .await
            .map_err(|_| format!("timed out after {}s", self.timeout.as_secs()))?
            .map_err(|e| format!("could not run {}: {e}", self.git_binary))?;

        if status.success() {
            Ok(())
        } else {
            Err(format!("git exited with {status}"))
        }
    }
}

#[async_trait]
impl SnapshotProvider for GitCloner {
    async fn acquire(&self, repo: &RepositoryRef) -> Result<Snapshot> {
        if !self.checkout_parent.exists() {
            tokio::fs::create_dir_all(&self.checkout_parent).await?;
        }

        let destination = self.checkout_path(repo);
        let url = repo.clone_url(&self.web_url);

        info!("Cloning {url} into {}", destination.display());

        // The guard removes a partially written checkout on failure.
        let snapshot = Snapshot::adopt(destination);

        match self.run_clone(&url, snapshot.root()).await {
            Ok(()) if snapshot.root().is_dir() => {
                debug!("Clone of {repo} completed");
                Ok(snapshot)
            }
            Ok(()) => Err(RepoLensError::CloneFailed {
                repo: repo.slug(),
                reason: "clone produced no checkout directory".to_string(),
            }),
            Err(reason) => {
                warn!("Clone of {repo} failed: {reason}");
                Err(RepoLensError::CloneFailed {
                    repo: repo.slug(),
                    reason,
                })
            }
        }
    }
}
