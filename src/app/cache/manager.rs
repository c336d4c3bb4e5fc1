//! Cache manager: entry registry plus whole-cache administration
//!
//! The manager owns the base directory, the download collaborator, the
//! in-flight reservations and the entry registry. Dropping it drops all of
//! them; two managers never share state.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info};

use crate::app::client::{ClientConfig, DownloadOptions, Downloader, HttpDownloader};
use crate::errors::{CacheResult, Result};

use super::base_dir::{BaseDirectory, DirectoryStatus};
use super::config::CacheConfig;
use super::entry::{CacheContext, CacheEntry, FetchOutcome};
use super::key::CacheKey;
use super::path::PathGenerator;
use super::registry::CacheRegistry;
use super::reservation::ReservationTable;
use super::stats::{CacheStats, DirectoryScanner};

/// Main cache management system
pub struct CacheManager {
    /// Configuration
    config: CacheConfig,
    /// Collaborators shared with every entry
    context: Arc<CacheContext>,
    /// One entry per URI
    registry: CacheRegistry,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("base_dir", &self.context.base_dir)
            .finish_non_exhaustive()
    }
}

impl CacheManager {
    /// Create a new cache manager
    ///
    /// # Arguments
    ///
    /// * `config` - Cache configuration
    /// * `downloader` - Transport used on cache misses
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if no cache root is configured and the platform
    /// cache directory cannot be determined. The root itself is not created
    /// here; the first fetch creates it.
    pub async fn new(config: CacheConfig, downloader: Arc<dyn Downloader>) -> CacheResult<Self> {
        let cache_root = config.resolve_cache_root()?;

        info!(
            "Initialized cache manager with root: {}",
            cache_root.display()
        );

        let context = Arc::new(CacheContext {
            base_dir: BaseDirectory::new(cache_root),
            downloader,
            reservations: ReservationTable::new(),
        });

        Ok(Self {
            config,
            registry: CacheRegistry::new(Arc::clone(&context)),
            context,
        })
    }

    /// Create a cache manager that downloads over HTTP
    pub async fn with_http_client(config: CacheConfig, client_config: &ClientConfig) -> Result<Self> {
        let downloader = HttpDownloader::with_config(client_config)?;
        Ok(Self::new(config, Arc::new(downloader)).await?)
    }

    /// Get the cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the current base directory
    pub async fn base_dir(&self) -> PathBuf {
        self.context.base_dir.current().await
    }

    /// Repoint the cache at another directory
    ///
    /// Takes effect for every operation started afterwards; running fetches
    /// keep the directory they started with.
    pub async fn set_base_dir(&self, path: impl Into<PathBuf>) -> PathBuf {
        self.context.base_dir.set(path).await
    }

    /// Create the base directory if it is missing
    pub async fn ensure_base_dir(&self) -> DirectoryStatus {
        self.context.base_dir.ensure().await
    }

    /// Get the entry for `uri`
    ///
    /// The first call registers the entry with `options`; later calls return
    /// that same entry and ignore their `options`.
    pub async fn get(&self, uri: &str, options: DownloadOptions) -> Arc<CacheEntry> {
        self.registry.get(uri, options).await
    }

    /// Shorthand for `get(uri, options)` followed by [`CacheEntry::fetch`]
    pub async fn fetch(&self, uri: &str, options: DownloadOptions) -> FetchOutcome {
        self.get(uri, options).await.fetch().await
    }

    /// Where `uri` is (or would be) installed under the current base directory
    pub async fn get_file_path(&self, uri: &str) -> PathBuf {
        PathGenerator::final_path(&self.base_dir().await, &CacheKey::derive(uri))
    }

    /// Delete everything in the cache and recreate an empty base directory
    pub async fn clear_cache(&self) -> CacheResult<()> {
        let base_dir = self.base_dir().await;

        match fs::remove_dir_all(&base_dir).await {
            Ok(()) => debug!("Removed cache tree {}", base_dir.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&base_dir).await?;

        info!("Cleared cache at {}", base_dir.display());
        Ok(())
    }

    /// Total bytes stored below the base directory
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotFound` if the base directory does not exist
    pub async fn get_cache_size(&self) -> CacheResult<u64> {
        DirectoryScanner::directory_size(&self.base_dir().await).await
    }

    /// Delete the installed file for `uri`, if any
    pub async fn remove_cache_entry(&self, uri: &str) -> CacheResult<()> {
        let path = self.get_file_path(uri).await;

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Removed cached {} ({})", uri, path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Nothing cached for {}", uri);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get cache statistics
    pub async fn get_cache_stats(&self) -> CacheResult<CacheStats> {
        let base_dir = self.base_dir().await;
        let summary = DirectoryScanner::scan_cache_directory(&base_dir).await?;

        let mut stats = CacheStats::new(base_dir);
        stats.set_disk_stats(&summary);
        stats.set_entry_stats(
            self.registry.len().await,
            self.context.reservations.len(),
        );
        Ok(stats)
    }

    /// Delete temporary files whose download is no longer running
    ///
    /// Returns the number of files removed.
    pub async fn remove_orphaned_temp_files(&self) -> CacheResult<usize> {
        let base_dir = self.base_dir().await;
        let summary = DirectoryScanner::scan_cache_directory(&base_dir).await?;

        let mut removed = 0;
        for temp_file in summary.temp_files {
            let in_flight = match PathGenerator::temp_target(&temp_file) {
                Some(target) => {
                    let final_path = temp_file.with_file_name(target);
                    self.context.reservations.is_reserved(&final_path)
                }
                None => false,
            };
            if in_flight {
                debug!("Keeping in-flight download {}", temp_file.display());
                continue;
            }

            match fs::remove_file(&temp_file).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        if removed > 0 {
            info!("Removed {} orphaned temporary files", removed);
        }
        Ok(removed)
    }

    /// Number of URIs registered so far
    pub async fn registered_entries(&self) -> usize {
        self.registry.len().await
    }
}
