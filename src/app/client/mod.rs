//! Download collaborator for the cache
//!
//! The module is organized into specialized components:
//! - `download`: the [`Downloader`] seam, [`DownloadOptions`] and [`DownloadOutcome`]
//! - `config`: HTTP client configuration and building
//! - `http`: the `reqwest` backed [`HttpDownloader`]

pub mod config;
pub mod download;
pub mod http;

pub use config::ClientConfig;
pub use download::{DownloadOptions, DownloadOutcome, Downloader};
pub use http::HttpDownloader;
