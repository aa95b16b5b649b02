#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for pkgrepo
//!
//! This crate handles every transfer against a remote repository: small
//! metadata fetches, streaming artifact downloads, `file://` sources, and
//! retry with exponential backoff on transient failures.

mod client;
mod download;
mod retry;

pub use client::{NetClient, NetConfig};
pub use download::{download_file, write_atomic, DownloadResult};
pub use retry::{RetryConfig, TransferKind};

use pkgrepo_errors::{Error, NetworkError};
use pkgrepo_events::EventSender;
use reqwest::StatusCode;
use std::path::PathBuf;
use url::Url;

/// Fetch the body at `url` into memory.
///
/// Returns `Ok(None)` when the resource does not exist (HTTP 404/410 or a
/// missing `file://` path); "not found" is never retried.
///
/// # Errors
///
/// Returns an error for invalid URLs, non-success statuses once retries are
/// exhausted, and local read failures on `file://` URLs.
pub async fn fetch_bytes(
    client: &NetClient,
    url: &str,
    kind: TransferKind,
    tx: Option<&EventSender>,
) -> Result<Option<Vec<u8>>, Error> {
    let parsed = validate_url(url)?;

    if parsed.scheme() == "file" {
        let path = file_url_path(&parsed)?;
        return match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io_with_path(&e, path)),
        };
    }

    retry::with_retries(&client.config().retry, url, kind, tx, || async move {
        let response = client.get_once(url).await?;
        let status = response.status();
        if is_not_found(status) {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(retry::status_error(status, url));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| client::map_reqwest_error(url, &e))?;
        Ok(Some(body.to_vec()))
    })
    .await
}

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")).into())
}

/// Validate URL and check for supported protocols
///
/// # Errors
///
/// Returns an error for malformed URLs and schemes other than http, https
/// and file.
pub fn validate_url(url: &str) -> Result<Url, Error> {
    let parsed = parse_url(url)?;
    match parsed.scheme() {
        "http" | "https" | "file" => Ok(parsed),
        scheme => Err(NetworkError::UnsupportedProtocol {
            scheme: scheme.to_string(),
        }
        .into()),
    }
}

pub(crate) fn is_not_found(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND || status == StatusCode::GONE
}

pub(crate) fn file_url_path(url: &Url) -> Result<PathBuf, Error> {
    url.to_file_path()
        .map_err(|()| NetworkError::InvalidUrl(url.to_string()).into())
}
