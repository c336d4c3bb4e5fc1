//! Cache statistics and disk usage
//!
//! Sizes count every file below the base directory, including temporary
//! files from downloads that never finished.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::{CacheError, CacheResult};

use super::path::PathGenerator;

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Cache root directory
    pub cache_root: PathBuf,
    /// Installed entries on disk
    pub cached_files_count: usize,
    /// Total size of every file below the root, in bytes
    pub total_cache_size: u64,
    /// Temporary files left on disk
    pub temp_files_count: usize,
    /// Entries registered with the manager
    pub registered_entries: usize,
    /// Downloads currently in flight
    pub in_flight_downloads: usize,
}

impl CacheStats {
    /// Create new cache statistics
    pub fn new(cache_root: PathBuf) -> Self {
        Self {
            cache_root,
            cached_files_count: 0,
            total_cache_size: 0,
            temp_files_count: 0,
            registered_entries: 0,
            in_flight_downloads: 0,
        }
    }

    /// Update counts gathered from the manager
    pub fn set_entry_stats(&mut self, registered_entries: usize, in_flight_downloads: usize) {
        self.registered_entries = registered_entries;
        self.in_flight_downloads = in_flight_downloads;
    }

    /// Update disk usage statistics
    pub fn set_disk_stats(&mut self, summary: &ScanSummary) {
        self.cached_files_count = summary.file_count - summary.temp_files.len();
        self.total_cache_size = summary.total_size;
        self.temp_files_count = summary.temp_files.len();
    }

    /// Format cache size in human-readable format
    pub fn format_cache_size(&self) -> String {
        format_bytes(self.total_cache_size)
    }
}

/// Result of walking the cache directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Every regular file found
    pub file_count: usize,
    /// Aggregate size of those files
    pub total_size: u64,
    /// Temporary download files among them
    pub temp_files: Vec<PathBuf>,
}

/// Directory scanner for cache statistics
pub struct DirectoryScanner;

impl DirectoryScanner {
    /// Scan the cache directory
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotFound` if `cache_root` does not exist, and
    /// `CacheError::Io` if its existence cannot be checked
    pub async fn scan_cache_directory(cache_root: &Path) -> CacheResult<ScanSummary> {
        if !tokio::fs::try_exists(cache_root).await? {
            return Err(CacheError::NotFound {
                path: cache_root.to_path_buf(),
            });
        }

        // Walking a large tree is blocking work
        let root = cache_root.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let mut summary = ScanSummary::default();
            Self::scan_directory_recursive(&root, &mut summary)?;
            Ok(summary)
        })
        .await
        .map_err(|e| CacheError::InvalidState {
            reason: format!("Cache scan task failed: {}", e),
        })?
    }

    /// Aggregate size of everything below `cache_root`
    pub async fn directory_size(cache_root: &Path) -> CacheResult<u64> {
        Ok(Self::scan_cache_directory(cache_root).await?.total_size)
    }

    fn scan_directory_recursive(dir: &Path, summary: &mut ScanSummary) -> io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                Self::scan_directory_recursive(&path, summary)?;
            } else if file_type.is_file() {
                summary.file_count += 1;
                summary.total_size += entry.metadata()?.len();
                if PathGenerator::is_temp_file(&path) {
                    summary.temp_files.push(path);
                }
            }
        }
        Ok(())
    }
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: u64 = 1024;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD as f64 && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD as f64;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
