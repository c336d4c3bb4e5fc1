//! Cache key derivation
//!
//! A URI maps to a `{key, extension}` pair. The key is a fixed tag followed by
//! the MD5 hex digest of the full URI; the extension is lifted from the last
//! path segment so cached files keep a recognisable suffix.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::app::hash::Md5Hash;
use crate::constants::cache;

/// Deterministic on-disk name for one URI
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// `I` followed by the MD5 hex digest of the URI
    pub key: String,
    /// Suffix of the last path segment, including the leading dot
    pub extension: String,
}

impl CacheKey {
    /// Derive the key for a URI
    ///
    /// Pure and infallible: the same URI always yields the same key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use image_cache::app::cache::CacheKey;
    ///
    /// let key = CacheKey::derive("https://x/photo.png?x=1");
    /// assert_eq!(key.extension, ".png");
    /// assert!(key.key.starts_with('I'));
    ///
    /// assert_eq!(CacheKey::derive("https://x/noext").extension, ".jpg");
    /// ```
    pub fn derive(uri: &str) -> Self {
        Self {
            key: format!("{}{}", cache::KEY_PREFIX, Md5Hash::compute(uri)),
            extension: Self::extension_of(uri),
        }
    }

    /// File name of the installed entry
    pub fn file_name(&self) -> String {
        format!("{}{}", self.key, self.extension)
    }

    fn extension_of(uri: &str) -> String {
        // Query first, so `/` and `.` inside it cannot pick the segment
        let without_query = match uri.find('?') {
            Some(index) => &uri[..index],
            None => uri,
        };
        let segment = match without_query.rfind('/') {
            Some(index) => &without_query[index..],
            None => without_query,
        };

        match segment.rfind('.') {
            Some(index) => segment[index..].to_string(),
            None => cache::DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.key, self.extension)
    }
}
