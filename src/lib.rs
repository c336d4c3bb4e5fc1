//! Image Cache Library
//!
//! A disk cache for remotely fetched resources. Each URI maps to a
//! deterministic file under a base directory; the first request downloads
//! it, later requests are served from disk.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use app::cache::{CacheConfig, CacheEntry, CacheManager, FetchOutcome};
pub use app::client::{DownloadOptions, Downloader};
pub use errors::{AppError, Result};
