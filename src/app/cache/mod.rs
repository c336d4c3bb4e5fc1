//! Disk cache for remotely fetched resources
//!
//! This module maps URIs to deterministic files under a base directory and
//! downloads them on first use.
//!
//! # Key Features
//!
//! - **Deterministic names**: `I` + MD5(uri) + extension of the last path segment
//! - **Atomic installs**: downloads land in a per-attempt temp file and are renamed into place
//! - **Single-flight**: concurrent fetches of one URI share a single download
//! - **Instance-owned state**: base directory and registry belong to one [`CacheManager`]
//!
//! # Module Organization
//!
//! - [`config`] - Configuration types and defaults
//! - [`key`] - URI to cache key derivation
//! - [`path`] - Final and temporary file paths
//! - [`base_dir`] - Base directory ownership and creation
//! - [`reservation`] - In-flight download table
//! - [`entry`] - Per-URI download/install state machine
//! - [`registry`] - One entry per URI
//! - [`stats`] - Cache statistics and disk usage
//! - [`manager`] - Cache manager and administration
//!
//! # Examples
//!
//! ```rust,no_run
//! use image_cache::app::cache::{CacheConfig, CacheManager};
//! use image_cache::app::client::{ClientConfig, DownloadOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = CacheManager::with_http_client(CacheConfig::default(), &ClientConfig::default()).await?;
//!
//! let entry = cache
//!     .get("https://example.com/images/cat.png", DownloadOptions::default())
//!     .await;
//!
//! match entry.get_path().await {
//!     Some(path) => println!("cached at {}", path.display()),
//!     None => println!("download failed"),
//! }
//!
//! println!("cache holds {} bytes", cache.get_cache_size().await?);
//! # Ok(())
//! # }
//! ```

pub mod base_dir;
pub mod config;
pub mod entry;
pub mod key;
pub mod manager;
pub mod path;
pub mod registry;
pub mod reservation;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main public API
pub use base_dir::{BaseDirectory, DirectoryStatus};
pub use config::CacheConfig;
pub use entry::{CacheEntry, EntryState, FetchOutcome};
pub use key::CacheKey;
pub use manager::CacheManager;
pub use path::PathGenerator;
pub use registry::CacheRegistry;
pub use reservation::{ReservationInfo, ReservationRole, ReservationTable};
pub use stats::{CacheStats, ScanSummary};
