//! Application constants for the image cache
//!
//! This module centralizes all constants used throughout the crate,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Environment variable overriding the cache base directory
    pub const CACHE_DIR: &str = "IMAGE_CACHE_DIR";
}

/// Cache key and layout constants
pub mod cache {
    /// Directory name appended to the platform cache root
    pub const DEFAULT_SUBDIR: &str = "image-cache";

    /// Single-character tag prepended to every cache key
    pub const KEY_PREFIX: &str = "I";

    /// Extension used when a URI's last path segment has none
    pub const DEFAULT_EXTENSION: &str = ".jpg";
}

/// File operation constants
pub mod files {
    /// Suffix marking an in-progress (or orphaned) download
    pub const TEMP_FILE_SUFFIX: &str = ".part";

    /// Download chunk size for streaming (8KB)
    pub const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("image-cache/", env!("CARGO_PKG_VERSION"));

    /// Status code the downloader must report for an install to happen
    pub const SUCCESS_STATUS: u16 = 200;

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;
}

/// Configuration file locations
pub mod config {
    /// Project-local configuration file name
    pub const LOCAL_FILE_NAME: &str = "image-cache.toml";

    /// Directory under the user config dir holding `config.toml`
    pub const APP_DIR_NAME: &str = "image-cache";

    /// Configuration file name inside [`APP_DIR_NAME`]
    pub const FILE_NAME: &str = "config.toml";
}

/// Logging and debugging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

// Re-export commonly used constants for convenience
pub use cache::{DEFAULT_EXTENSION, KEY_PREFIX};
pub use files::TEMP_FILE_SUFFIX;
pub use http::{SUCCESS_STATUS, USER_AGENT};
