//! Per-URI cache entry and its download/install state machine
//!
//! ```text
//! Idle -> Probing -> Hit
//!                 -> Downloading -> Failed
//!                                -> Installing -> Installed
//!                                              -> Failed
//! ```
//!
//! A fetch probes the final path first and only downloads on a miss. The
//! download always lands in a per-attempt temporary file which is renamed
//! onto the final path once the downloader reports success. Every failure
//! transition deletes that temporary file, and so does dropping a fetch
//! before it was installed.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::app::client::{DownloadOptions, Downloader};
use crate::app::hash::Md5Hash;

use super::base_dir::{BaseDirectory, DirectoryStatus};
use super::key::CacheKey;
use super::path::PathGenerator;
use super::reservation::{ReservationRole, ReservationTable};

/// State of the most recent fetch of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EntryState {
    /// No fetch started yet
    Idle,
    /// Checking whether the final path exists
    Probing,
    /// Final path already existed, nothing downloaded
    Hit,
    /// Downloader is writing the temporary file
    Downloading,
    /// Moving the temporary file onto the final path
    Installing,
    /// Downloaded and installed
    Installed,
    /// Download or install failed; nothing at the final path
    Failed { reason: String },
}

impl EntryState {
    /// Whether a fetch in this state has finished
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EntryState::Hit | EntryState::Installed | EntryState::Failed { .. }
        )
    }

    /// Whether the fetch ended in failure
    pub fn is_failed(&self) -> bool {
        matches!(self, EntryState::Failed { .. })
    }

    /// Get the error message if the fetch failed
    pub fn get_error(&self) -> Option<&str> {
        match self {
            EntryState::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Full result of one fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutcome {
    /// Installed path, absent when the fetch failed
    pub path: Option<PathBuf>,
    /// Terminal state the fetch ended in
    pub state: EntryState,
    /// What happened when the base directory was prepared
    pub directory: DirectoryStatus,
    /// Body digest, when a checksum was requested and a download happened
    pub checksum: Option<Md5Hash>,
}

impl FetchOutcome {
    fn hit(path: PathBuf, directory: DirectoryStatus) -> Self {
        Self {
            path: Some(path),
            state: EntryState::Hit,
            directory,
            checksum: None,
        }
    }

    fn installed(path: PathBuf, directory: DirectoryStatus, checksum: Option<Md5Hash>) -> Self {
        Self {
            path: Some(path),
            state: EntryState::Installed,
            directory,
            checksum,
        }
    }

    fn failed(reason: String, directory: DirectoryStatus) -> Self {
        Self {
            path: None,
            state: EntryState::Failed { reason },
            directory,
            checksum: None,
        }
    }

    /// Whether the base directory could not be prepared during the fetch
    pub fn is_degraded(&self) -> bool {
        self.directory.is_degraded()
    }
}

/// Collaborators shared by the manager and every entry it hands out
pub(crate) struct CacheContext {
    pub(crate) base_dir: BaseDirectory,
    pub(crate) downloader: Arc<dyn Downloader>,
    pub(crate) reservations: ReservationTable,
}

/// Orchestrates fetching one URI into the cache
pub struct CacheEntry {
    uri: String,
    options: DownloadOptions,
    context: Arc<CacheContext>,
    state: RwLock<EntryState>,
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("uri", &self.uri)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CacheEntry {
    pub(crate) fn new(uri: String, options: DownloadOptions, context: Arc<CacheContext>) -> Self {
        Self {
            uri,
            options,
            context,
            state: RwLock::new(EntryState::Idle),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Options captured when the entry was first registered
    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::derive(&self.uri)
    }

    /// State of the most recent fetch
    pub async fn state(&self) -> EntryState {
        self.state.read().await.clone()
    }

    /// Local path of the resource, downloading it on a cache miss
    ///
    /// Returns `None` when the download or the install failed. Nothing is
    /// retried; call again to make a new attempt.
    pub async fn get_path(&self) -> Option<PathBuf> {
        self.fetch().await.path
    }

    /// Like [`Self::get_path`], but reports how the fetch went
    pub async fn fetch(&self) -> FetchOutcome {
        let key = self.key();
        let base_dir = self.context.base_dir.current().await;
        let final_path = PathGenerator::final_path(&base_dir, &key);

        let (outcome, role) = self
            .context
            .reservations
            .run(&final_path, || self.attempt(&key, &base_dir, &final_path))
            .await;

        if role == ReservationRole::Follower {
            self.set_state(outcome.state.clone()).await;
        }
        outcome
    }

    async fn attempt(&self, key: &CacheKey, base_dir: &Path, final_path: &Path) -> FetchOutcome {
        self.set_state(EntryState::Probing).await;
        let directory = BaseDirectory::ensure_at(base_dir).await;

        if fs::try_exists(final_path).await.unwrap_or(false) {
            debug!("Cache hit for {}: {}", self.uri, final_path.display());
            self.set_state(EntryState::Hit).await;
            return FetchOutcome::hit(final_path.to_path_buf(), directory);
        }

        let temp_file = TempFile::new(PathGenerator::temp_path(base_dir, key));
        self.set_state(EntryState::Downloading).await;
        debug!(
            "Cache miss for {}, downloading to {}",
            self.uri,
            temp_file.path().display()
        );

        let download = self
            .context
            .downloader
            .download(&self.uri, temp_file.path(), &self.options)
            .await;

        let checksum = match download {
            Ok(outcome) if outcome.is_success() => outcome.md5,
            Ok(outcome) => {
                let reason = format!("download returned status {}", outcome.status);
                return self.fail(reason, temp_file, directory).await;
            }
            Err(e) => {
                let reason = format!("download failed: {}", e);
                return self.fail(reason, temp_file, directory).await;
            }
        };

        self.set_state(EntryState::Installing).await;
        let directory = match BaseDirectory::ensure_at(base_dir).await {
            status @ DirectoryStatus::Degraded { .. } => status,
            _ => directory,
        };

        let install = fs::rename(temp_file.path(), final_path).await;
        if let Err(e) = install {
            error!(
                "Failed to install {} to {}: {}",
                temp_file.path().display(),
                final_path.display(),
                e
            );
            let reason = format!("install failed: {}", e);
            return self.fail(reason, temp_file, directory).await;
        }
        temp_file.installed();

        info!("Cached {} at {}", self.uri, final_path.display());
        self.set_state(EntryState::Installed).await;
        FetchOutcome::installed(final_path.to_path_buf(), directory, checksum)
    }

    async fn fail(&self, reason: String, temp_file: TempFile, directory: DirectoryStatus) -> FetchOutcome {
        warn!("Could not cache {}: {}", self.uri, reason);
        temp_file.discard().await;
        self.set_state(EntryState::Failed {
            reason: reason.clone(),
        })
        .await;
        FetchOutcome::failed(reason, directory)
    }

    async fn set_state(&self, state: EntryState) {
        *self.state.write().await = state;
    }
}

/// Per-attempt download file, deleted on drop unless it was installed
struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// The file now lives at the final path
    fn installed(mut self) {
        self.armed = false;
    }

    async fn discard(mut self) {
        self.armed = false;
        log_removal(&self.path, fs::remove_file(&self.path).await);
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.armed {
            debug!("Fetch dropped before install, cleaning up {}", self.path.display());
            log_removal(&self.path, std::fs::remove_file(&self.path));
        }
    }
}

fn log_removal(temp_path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => debug!("Removed temporary file {}", temp_path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => error!(
            "Failed to remove temporary file {}: {}",
            temp_path.display(),
            e
        ),
    }
}
