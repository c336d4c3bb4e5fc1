//! Integration tests for the image cache
//!
//! These tests use only the public API: a custom downloader plugged in
//! through the `Downloader` trait, and the HTTP downloader against a local
//! mock server.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use image_cache::app::cache::{CacheConfig, CacheManager, EntryState};
use image_cache::app::client::{
    ClientConfig, DownloadOptions, DownloadOutcome, Downloader, HttpDownloader,
};
use image_cache::errors::{CacheError, DownloadResult};

/// Serves a body derived from the URI and counts downloads per call
#[derive(Default)]
struct EchoDownloader {
    calls: AtomicUsize,
    delay: Duration,
}

impl EchoDownloader {
    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Downloader for EchoDownloader {
    async fn download(
        &self,
        uri: &str,
        destination: &Path,
        _options: &DownloadOptions,
    ) -> DownloadResult<DownloadOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        if uri.contains("missing") {
            return Ok(DownloadOutcome::new(404, 0));
        }
        tokio::fs::write(destination, uri.as_bytes()).await?;
        Ok(DownloadOutcome::new(200, uri.len() as u64))
    }
}

async fn cache_with(temp_dir: &TempDir, downloader: Arc<dyn Downloader>) -> CacheManager {
    let config = CacheConfig::with_cache_root(temp_dir.path().join("cache"));
    CacheManager::new(config, downloader).await.unwrap()
}

#[tokio::test]
async fn test_entry_lifecycle_through_public_api() {
    let temp_dir = TempDir::new().unwrap();
    let downloader = Arc::new(EchoDownloader::default());
    let cache = cache_with(&temp_dir, downloader.clone()).await;

    let uri = "https://example.com/images/cat.png";
    let entry = cache.get(uri, DownloadOptions::default()).await;
    assert_eq!(entry.state().await, EntryState::Idle);

    let path = entry.get_path().await.unwrap();
    assert_eq!(
        path,
        temp_dir
            .path()
            .join("cache")
            .join("I02fceca1b8bfe8fedc9fd705a64b7978.png")
    );
    assert_eq!(entry.state().await, EntryState::Installed);
    assert_eq!(std::fs::read(&path).unwrap(), uri.as_bytes());

    // A second lookup of the same URI is the same entry and hits the disk
    let again = cache.get(uri, DownloadOptions::default()).await;
    assert!(Arc::ptr_eq(&entry, &again));
    assert_eq!(again.get_path().await, Some(path));
    assert_eq!(again.state().await, EntryState::Hit);
    assert_eq!(downloader.calls(), 1);
}

#[tokio::test]
async fn test_many_callers_single_download() {
    let temp_dir = TempDir::new().unwrap();
    let downloader = Arc::new(EchoDownloader::slow(Duration::from_millis(50)));
    let cache = Arc::new(cache_with(&temp_dir, downloader.clone()).await);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            cache
                .get("https://x/shared.webp", DownloadOptions::default())
                .await
                .get_path()
                .await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_some());
    }
    assert_eq!(downloader.calls(), 1);
}

#[tokio::test]
async fn test_first_options_win_across_callers() {
    let temp_dir = TempDir::new().unwrap();
    let cache = cache_with(&temp_dir, Arc::new(EchoDownloader::default())).await;

    let first = DownloadOptions::default().with_header("Authorization", "Bearer one");
    cache.get("https://x/a.png", first.clone()).await;

    let later = cache
        .get(
            "https://x/a.png",
            DownloadOptions::default().with_header("Authorization", "Bearer two"),
        )
        .await;
    assert_eq!(later.options(), &first);
}

#[tokio::test]
async fn test_failed_download_yields_no_path() {
    let temp_dir = TempDir::new().unwrap();
    let cache = cache_with(&temp_dir, Arc::new(EchoDownloader::default())).await;

    let outcome = cache
        .fetch("https://x/missing.png", DownloadOptions::default())
        .await;
    assert_eq!(outcome.path, None);
    assert!(outcome.state.is_failed());
    assert_eq!(assert_ok!(cache.get_cache_size().await), 0);
}

#[tokio::test]
async fn test_fresh_cache_has_no_directory_yet() {
    let temp_dir = TempDir::new().unwrap();
    let cache = cache_with(&temp_dir, Arc::new(EchoDownloader::default())).await;

    let error = assert_err!(cache.get_cache_size().await);
    assert!(matches!(error, CacheError::NotFound { .. }));
    assert!(!temp_dir.path().join("cache").exists());
}

#[tokio::test]
async fn test_administration() {
    let temp_dir = TempDir::new().unwrap();
    let cache = cache_with(&temp_dir, Arc::new(EchoDownloader::default())).await;

    let kept = "https://x/kept.png";
    let dropped = "https://x/dropped.png";
    cache.fetch(kept, DownloadOptions::default()).await;
    cache.fetch(dropped, DownloadOptions::default()).await;

    let total = (kept.len() + dropped.len()) as u64;
    assert_eq!(assert_ok!(cache.get_cache_size().await), total);

    assert_ok!(cache.remove_cache_entry(dropped).await);
    assert_ok!(cache.remove_cache_entry(dropped).await);
    assert_eq!(
        assert_ok!(cache.get_cache_size().await),
        kept.len() as u64
    );

    assert_ok!(cache.clear_cache().await);
    assert_eq!(assert_ok!(cache.get_cache_size().await), 0);

    let moved = temp_dir.path().join("moved");
    cache.set_base_dir(&moved).await;
    let error = assert_err!(cache.get_cache_size().await);
    assert!(matches!(error, CacheError::NotFound { .. }));
    assert!(error.to_string().ends_with("not found"));

    let outcome = cache.fetch(kept, DownloadOptions::default()).await;
    assert!(outcome.path.unwrap().starts_with(&moved));
}

#[tokio::test]
async fn test_http_downloader_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/logo.svg"))
        .and(header("X-Api-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<svg/>".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/gone.png"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let downloader = HttpDownloader::with_config(&ClientConfig::default()).unwrap();
    let cache = cache_with(&temp_dir, Arc::new(downloader)).await;

    let options = DownloadOptions::default()
        .with_header("X-Api-Key", "secret")
        .with_checksum(true);
    let uri = format!("{}/images/logo.svg", server.uri());

    let outcome = cache.fetch(&uri, options.clone()).await;
    let path = outcome.path.unwrap();
    assert!(path.to_string_lossy().ends_with(".svg"));
    assert_eq!(std::fs::read(&path).unwrap(), b"<svg/>");
    assert!(outcome.checksum.is_some());

    // Served from disk; the mock expects exactly one request
    assert_eq!(cache.fetch(&uri, options).await.state, EntryState::Hit);

    let gone = cache
        .fetch(
            &format!("{}/images/gone.png", server.uri()),
            DownloadOptions::default(),
        )
        .await;
    assert_eq!(gone.path, None);
    assert_eq!(assert_ok!(cache.get_cache_size().await), 6);
}
