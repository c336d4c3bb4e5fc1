//! Cache base directory ownership
//!
//! Each cache manager owns exactly one base directory. It can be repointed at
//! any time; operations that are already running keep the path they started
//! with.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Result of making sure the base directory exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DirectoryStatus {
    /// Directory was already there
    Existing,
    /// Directory was created by this call
    Created,
    /// Directory is unusable; operations continue best-effort
    Degraded { reason: String },
}

impl DirectoryStatus {
    /// Whether the directory could not be prepared
    pub fn is_degraded(&self) -> bool {
        matches!(self, DirectoryStatus::Degraded { .. })
    }
}

/// Mutable root under which all cached files are stored
#[derive(Debug)]
pub struct BaseDirectory {
    path: RwLock<PathBuf>,
}

impl BaseDirectory {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: RwLock::new(path),
        }
    }

    /// Snapshot of the current root
    pub async fn current(&self) -> PathBuf {
        self.path.read().await.clone()
    }

    /// Repoint the cache; no validation, effective for every later operation
    pub async fn set(&self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        let mut current = self.path.write().await;
        info!(
            "Base directory changed: {} -> {}",
            current.display(),
            path.display()
        );
        *current = path.clone();
        path
    }

    /// Ensure the current root exists
    pub async fn ensure(&self) -> DirectoryStatus {
        let path = self.current().await;
        Self::ensure_at(&path).await
    }

    /// Ensure `path` exists as a directory, creating intermediates
    ///
    /// Never fails: anything other than "already exists" is logged and
    /// reported as [`DirectoryStatus::Degraded`].
    pub async fn ensure_at(path: &Path) -> DirectoryStatus {
        match fs::metadata(path).await {
            Ok(metadata) if metadata.is_dir() => return DirectoryStatus::Existing,
            Ok(_) => {
                let reason = format!("{} exists and is not a directory", path.display());
                warn!("Cache directory degraded: {}", reason);
                return DirectoryStatus::Degraded { reason };
            }
            Err(_) => {}
        }

        match fs::create_dir_all(path).await {
            Ok(()) => {
                debug!("Created cache directory: {}", path.display());
                DirectoryStatus::Created
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => DirectoryStatus::Existing,
            Err(e) => {
                warn!(
                    "Failed to create cache directory {}: {}",
                    path.display(),
                    e
                );
                DirectoryStatus::Degraded {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ensure_creates_intermediate_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b").join("cache");
        let base_dir = BaseDirectory::new(nested.clone());

        assert_eq!(base_dir.ensure().await, DirectoryStatus::Created);
        assert!(nested.is_dir());

        // Second call is a no-op
        assert_eq!(base_dir.ensure().await, DirectoryStatus::Existing);
    }

    #[tokio::test]
    async fn test_ensure_reports_degraded_when_path_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("not-a-dir");
        std::fs::write(&file_path, b"x").unwrap();

        let status = BaseDirectory::ensure_at(&file_path).await;
        assert!(status.is_degraded());
    }

    #[tokio::test]
    async fn test_ensure_reports_degraded_below_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("blocker");
        std::fs::write(&file_path, b"x").unwrap();

        let status = BaseDirectory::ensure_at(&file_path.join("cache")).await;
        assert!(status.is_degraded());
    }

    #[tokio::test]
    async fn test_set_overwrites_unconditionally() {
        let base_dir = BaseDirectory::new(PathBuf::from("/first"));

        let returned = base_dir.set("/second").await;
        assert_eq!(returned, PathBuf::from("/second"));
        assert_eq!(base_dir.current().await, PathBuf::from("/second"));

        base_dir.set("").await;
        assert_eq!(base_dir.current().await, PathBuf::new());
    }
}
