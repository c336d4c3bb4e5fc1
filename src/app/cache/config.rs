//! Cache configuration types and defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::cache;
use crate::errors::{CacheError, CacheResult};

/// Configuration for the cache management system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Root directory for cache storage (OS-specific if None)
    pub cache_root: Option<PathBuf>,
}

impl CacheConfig {
    /// Create a new cache configuration with custom cache root
    pub fn with_cache_root(cache_root: PathBuf) -> Self {
        Self {
            cache_root: Some(cache_root),
        }
    }

    /// Directory the cache starts out in
    pub fn resolve_cache_root(&self) -> CacheResult<PathBuf> {
        match &self.cache_root {
            Some(path) => Ok(path.clone()),
            None => Self::default_cache_dir(),
        }
    }

    /// Platform cache directory plus the crate's subdirectory
    ///
    /// - macOS: ~/Library/Caches/image-cache
    /// - Linux: ~/.cache/image-cache
    /// - Windows: %LOCALAPPDATA%/image-cache
    pub fn default_cache_dir() -> CacheResult<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| CacheError::DirectoryNotAccessible {
                path: PathBuf::from("system cache directory"),
            })?
            .join(cache::DEFAULT_SUBDIR);

        Ok(cache_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_platform_dir() {
        let config = CacheConfig::default();
        assert_eq!(config.cache_root, None);

        if let Ok(root) = config.resolve_cache_root() {
            assert!(root.ends_with(cache::DEFAULT_SUBDIR));
        }
    }

    #[test]
    fn test_explicit_root_wins() {
        let config = CacheConfig::with_cache_root(PathBuf::from("/tmp/images"));
        assert_eq!(
            config.resolve_cache_root().unwrap(),
            PathBuf::from("/tmp/images")
        );
    }
}
