//! Error types for the image cache
//!
//! This module defines the error types for all components of the crate.
//! Soft failures of the fetch path (a failed download, a directory that could
//! not be created) never surface here; they are reported as an absent path or
//! a degraded directory status instead.

use std::path::PathBuf;
use thiserror::Error;

/// Download collaborator errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// I/O error while writing the destination file
    #[error("File I/O error")]
    Io(#[from] std::io::Error),

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Header name or value that cannot be sent
    #[error("Invalid request header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Generic error for other issues
    #[error("{0}")]
    Other(String),
}

/// Cache management errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Base directory does not exist
    #[error("{path} not found")]
    NotFound { path: PathBuf },

    /// Cache directory could not be created or read
    #[error("Cache directory not accessible: {path}")]
    DirectoryNotAccessible { path: PathBuf },

    /// File system operation failed
    #[error("Cache I/O error")]
    Io(#[from] std::io::Error),

    /// Invalid cache state
    #[error("Invalid cache state: {reason}")]
    InvalidState { reason: String },

    /// Malformed MD5 hex string
    #[error("Invalid hash format: {hash}. Expected MD5 hex string")]
    InvalidHash { hash: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("Failed to read configuration file")]
    Io(#[from] std::io::Error),

    /// No platform directory could be determined
    #[error("Could not determine the user {kind} directory")]
    NoPlatformDirectory { kind: &'static str },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Cache error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error means "nothing there" rather than a malfunction
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::Cache(CacheError::NotFound { .. })
                | AppError::Config(ConfigError::NotFound { .. })
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Download(_) => "download",
            AppError::Cache(_) => "cache",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Cache result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
