//! Shared test helpers for the cache module

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::app::client::{DownloadOptions, DownloadOutcome, Downloader};
use crate::app::hash::Md5Hash;
use crate::errors::{DownloadError, DownloadResult};


/// Downloader double with a fixed answer that counts its invocations
pub struct ScriptedDownloader {
    status: u16,
    body: Vec<u8>,
    error: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedDownloader {
    /// Writes `body` and reports HTTP 200
    pub fn succeeding(body: &[u8]) -> Self {
        Self::with_status(200, body)
    }

    /// Writes `body` and reports `status`, like a server error page would
    pub fn with_status(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            body: body.to_vec(),
            error: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Leaves a partial file behind and returns a transport error
    pub fn erroring(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::with_status(200, b"partial")
        }
    }

    /// Sleep after writing, to keep downloads in flight
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Downloader for ScriptedDownloader {
    async fn download(
        &self,
        _uri: &str,
        destination: &Path,
        options: &DownloadOptions,
    ) -> DownloadResult<DownloadOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::write(destination, &self.body).await?;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.error {
            return Err(DownloadError::Other(message.clone()));
        }

        let outcome = DownloadOutcome::new(self.status, self.body.len() as u64);
        Ok(if options.verify_checksum() {
            outcome.with_md5(Md5Hash::compute(&self.body))
        } else {
            outcome
        })
    }
}
