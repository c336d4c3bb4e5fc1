//! Core application logic for the image cache
//!
//! This module contains the cache itself, the download collaborator it
//! fetches through, and MD5 hashing.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use image_cache::app::{CacheConfig, CacheManager, DownloadOptions, HttpDownloader};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Arc::new(HttpDownloader::new(reqwest::Client::new()));
//! let cache = CacheManager::new(CacheConfig::default(), downloader).await?;
//!
//! let outcome = cache
//!     .fetch("https://example.com/images/cat.png", DownloadOptions::default())
//!     .await;
//! if let Some(path) = outcome.path {
//!     println!("cached at {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod hash;

// Re-export main public API
pub use cache::{
    CacheConfig, CacheEntry, CacheKey, CacheManager, CacheStats, DirectoryStatus, EntryState,
    FetchOutcome,
};
pub use client::{ClientConfig, DownloadOptions, DownloadOutcome, Downloader, HttpDownloader};
pub use hash::Md5Hash;
