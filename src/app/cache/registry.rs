//! One cache entry per URI
//!
//! The registry hands out the same [`CacheEntry`] for every request of a URI.
//! Options are captured by the first request only; later requests with
//! different options still get the original entry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::app::client::DownloadOptions;

use super::entry::{CacheContext, CacheEntry};

/// Memoized entries by URI, living as long as their cache manager
pub struct CacheRegistry {
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
    context: Arc<CacheContext>,
}

impl CacheRegistry {
    pub(crate) fn new(context: Arc<CacheContext>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            context,
        }
    }

    /// Get the entry for `uri`, registering it with `options` if it is new
    pub async fn get(&self, uri: &str, options: DownloadOptions) -> Arc<CacheEntry> {
        if let Some(entry) = self.entries.read().await.get(uri) {
            if entry.options() != &options {
                debug!("Ignoring new download options for already registered {}", uri);
            }
            return Arc::clone(entry);
        }

        let mut entries = self.entries.write().await;
        let entry = entries.entry(uri.to_string()).or_insert_with(|| {
            debug!("Registered cache entry for {}", uri);
            Arc::new(CacheEntry::new(
                uri.to_string(),
                options,
                Arc::clone(&self.context),
            ))
        });
        Arc::clone(entry)
    }

    /// Check if `uri` already has an entry
    pub async fn contains(&self, uri: &str) -> bool {
        self.entries.read().await.contains_key(uri)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::cache::base_dir::BaseDirectory;
    use crate::app::cache::reservation::ReservationTable;
    use crate::app::cache::tests::ScriptedDownloader;
    use std::path::PathBuf;

    fn registry() -> CacheRegistry {
        CacheRegistry::new(Arc::new(CacheContext {
            base_dir: BaseDirectory::new(PathBuf::from("/unused")),
            downloader: Arc::new(ScriptedDownloader::succeeding(b"")),
            reservations: ReservationTable::new(),
        }))
    }

    #[tokio::test]
    async fn test_same_uri_returns_same_entry() {
        let registry = registry();

        let first = registry
            .get("https://x/photo.png", DownloadOptions::default())
            .await;
        let second = registry
            .get("https://x/photo.png", DownloadOptions::default())
            .await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_first_options_win() {
        let registry = registry();
        let original = DownloadOptions::default().with_header("X-Token", "one");

        let first = registry.get("https://x/photo.png", original.clone()).await;
        let second = registry
            .get(
                "https://x/photo.png",
                DownloadOptions::default().with_checksum(true),
            )
            .await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.options(), &original);
    }

    #[tokio::test]
    async fn test_distinct_uris_get_distinct_entries() {
        let registry = registry();
        assert!(registry.is_empty().await);

        let a = registry.get("https://x/a.png", DownloadOptions::default()).await;
        let b = registry.get("https://x/b.png", DownloadOptions::default()).await;

        assert!(!Arc::ptr_eq(&a, &b));
        assert!(registry.contains("https://x/a.png").await);
        assert!(!registry.contains("https://x/c.png").await);
        assert_eq!(registry.len().await, 2);
    }
}
