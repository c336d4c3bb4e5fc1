//! Download collaborator seam
//!
//! The cache core never talks to the network itself. It hands a URI, a
//! temporary destination and the caller's [`DownloadOptions`] to a
//! [`Downloader`] and only looks at the reported status afterwards.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::hash::Md5Hash;
use crate::constants::http;
use crate::errors::DownloadResult;

/// Per-URI download options, passed through to the downloader untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOptions {
    /// Compute and report an MD5 digest of the received bytes
    pub verify_checksum: Option<bool>,
    /// Extra request headers
    pub headers: Option<HashMap<String, String>>,
}

impl DownloadOptions {
    /// Request an MD5 digest of the downloaded body
    pub fn with_checksum(mut self, enabled: bool) -> Self {
        self.verify_checksum = Some(enabled);
        self
    }

    /// Add a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Whether a checksum was requested
    pub fn verify_checksum(&self) -> bool {
        self.verify_checksum.unwrap_or(false)
    }
}

/// What a downloader reports once the transfer is over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    /// Transport status (HTTP status for the HTTP downloader)
    pub status: u16,
    /// Bytes written to the destination path
    pub bytes_written: u64,
    /// Digest of the body when a checksum was requested
    pub md5: Option<Md5Hash>,
}

impl DownloadOutcome {
    /// Outcome with no checksum
    pub fn new(status: u16, bytes_written: u64) -> Self {
        Self {
            status,
            bytes_written,
            md5: None,
        }
    }

    /// Attach a body digest
    pub fn with_md5(mut self, md5: Md5Hash) -> Self {
        self.md5 = Some(md5);
        self
    }

    /// Only the success status allows the file to be installed
    pub fn is_success(&self) -> bool {
        self.status == http::SUCCESS_STATUS
    }
}

/// Transfers the resource behind `uri` into `destination`
///
/// Implementations must write only to `destination`. Whatever they leave
/// there after a non-success outcome or an error is removed by the caller.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        uri: &str,
        destination: &Path,
        options: &DownloadOptions,
    ) -> DownloadResult<DownloadOutcome>;
}
