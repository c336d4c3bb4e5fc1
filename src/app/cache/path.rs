//! File path generation for cached entries
//!
//! Installed files live directly in the base directory as `key + extension`.
//! Every download attempt writes to its own temporary sibling,
//! `key + extension + "." + token + ".part"`, so no two attempts share a file
//! and a half-written download is never visible under the final name.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::files;

use super::key::CacheKey;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Path layout for the cache directory
pub struct PathGenerator;

impl PathGenerator {
    /// Where the entry for `key` is installed
    pub fn final_path(base_dir: &Path, key: &CacheKey) -> PathBuf {
        base_dir.join(key.file_name())
    }

    /// A fresh temporary path for one download attempt
    pub fn temp_path(base_dir: &Path, key: &CacheKey) -> PathBuf {
        base_dir.join(format!(
            "{}.{}{}",
            key.file_name(),
            Self::unique_token(),
            files::TEMP_FILE_SUFFIX
        ))
    }

    /// Whether a file name looks like a download attempt
    pub fn is_temp_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(files::TEMP_FILE_SUFFIX))
    }

    /// Final file name a temporary file was meant to become
    ///
    /// Returns `None` for names that were not produced by [`Self::temp_path`].
    pub fn temp_target(path: &Path) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        let (target, _token) = name.strip_suffix(files::TEMP_FILE_SUFFIX)?.rsplit_once('.')?;
        Some(target.to_string())
    }

    // Counter keeps tokens unique in this process, the random part across processes.
    fn unique_token() -> String {
        let sequence = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        format!("{:x}-{:08x}", sequence, fastrand::u32(..))
    }
}
