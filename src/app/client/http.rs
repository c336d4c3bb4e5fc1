//! HTTP implementation of the download collaborator
//!
//! Streams a response body straight into the destination file. There is no
//! retry or backoff here; a failed transfer is reported once and the caller
//! decides what to do.

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;
use url::Url;

use crate::app::client::config::ClientConfig;
use crate::app::client::download::{DownloadOptions, DownloadOutcome, Downloader};
use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// Downloader backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Wrap an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the client from configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Http` if the TLS backend cannot be initialised
    pub fn with_config(config: &ClientConfig) -> DownloadResult<Self> {
        Ok(Self::new(config.build_http_client()?))
    }

    /// Get the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn parse_url(uri: &str) -> DownloadResult<Url> {
        Url::parse(uri).map_err(|e| DownloadError::InvalidUrl {
            url: uri.to_string(),
            error: e.to_string(),
        })
    }

    fn build_headers(options: &DownloadOptions) -> DownloadResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let Some(extra) = options.headers.as_ref() else {
            return Ok(headers);
        };

        for (name, value) in extra {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| DownloadError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| DownloadError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(
        &self,
        uri: &str,
        destination: &Path,
        options: &DownloadOptions,
    ) -> DownloadResult<DownloadOutcome> {
        let url = Self::parse_url(uri)?;
        let headers = Self::build_headers(options)?;

        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status();

        if !status.is_success() {
            debug!("{} answered HTTP {}, body discarded", uri, status.as_u16());
            return Ok(DownloadOutcome::new(status.as_u16(), 0));
        }

        let file = File::create(destination).await?;
        let mut writer = BufWriter::with_capacity(files::DOWNLOAD_CHUNK_SIZE, file);
        let mut checksum = options.verify_checksum().then(md5::Context::new);
        let mut bytes_written = 0u64;

        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            if let Some(context) = checksum.as_mut() {
                context.consume(&chunk);
            }
            writer.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        writer.flush().await?;

        debug!(
            "Downloaded {} bytes from {} into {}",
            bytes_written,
            uri,
            destination.display()
        );

        let outcome = DownloadOutcome::new(status.as_u16(), bytes_written);
        Ok(match checksum {
            Some(context) => outcome.with_md5(context.compute().into()),
            None => outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::hash::Md5Hash;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn downloader() -> HttpDownloader {
        HttpDownloader::with_config(&ClientConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_download_writes_body_and_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/cat.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png bytes".to_vec()))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("cat.png.part");
        let uri = format!("{}/images/cat.png", server.uri());

        let outcome = downloader()
            .download(&uri, &destination, &DownloadOptions::default())
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.bytes_written, 9);
        assert_eq!(outcome.md5, None);
        assert_eq!(tokio::fs::read(&destination).await.unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn test_download_sends_headers_and_computes_checksum() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/private.jpg"))
            .and(header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec()))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("private.jpg.part");
        let options = DownloadOptions::default()
            .with_checksum(true)
            .with_header("Authorization", "Bearer token");

        let outcome = downloader()
            .download(&format!("{}/private.jpg", server.uri()), &destination, &options)
            .await
            .unwrap();

        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.md5, Some(Md5Hash::compute("hello world")));
    }

    #[tokio::test]
    async fn test_error_status_does_not_write_destination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("missing.png.part");

        let outcome = downloader()
            .download(
                &format!("{}/missing.png", server.uri()),
                &destination,
                &DownloadOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.status, 404);
        assert!(!outcome.is_success());
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let result = downloader()
            .download(
                "not-a-url",
                &temp_dir.path().join("x.part"),
                &DownloadOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }

    #[test]
    fn test_invalid_header_name_is_rejected() {
        let options = DownloadOptions::default().with_header("bad header", "x");
        let result = HttpDownloader::build_headers(&options);
        assert!(matches!(result, Err(DownloadError::InvalidHeader { .. })));
    }
}
