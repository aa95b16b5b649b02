//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum NetworkError {
    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("connection failed to {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported protocol: {scheme}")]
    UnsupportedProtocol { scheme: String },

    #[error("HTTP error {status} for {url}")]
    HttpError { status: u16, url: String },

    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        algorithm: String,
        expected: String,
        actual: String,
    },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl NetworkError {
    /// Transient failures are worth another attempt against the same remote.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::ConnectionFailed { .. } => true,
            Self::HttpError { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            _ => false,
        }
    }
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::ConnectionFailed { .. } => {
                Some("Check connectivity to the remote repository or raise the network timeout.")
            }
            Self::InvalidUrl(_) | Self::UnsupportedProtocol { .. } => {
                Some("Remote repository URLs must use http, https or file.")
            }
            Self::HttpError { status, .. } if *status == 429 => {
                Some("The remote is rate limiting requests; retry later.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        self.is_transient()
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Timeout { .. } => "network.timeout",
            Self::ConnectionFailed { .. } => "network.connection_failed",
            Self::DownloadFailed(_) => "network.download_failed",
            Self::InvalidUrl(_) => "network.invalid_url",
            Self::UnsupportedProtocol { .. } => "network.unsupported_protocol",
            Self::HttpError { .. } => "network.http_error",
            Self::ChecksumMismatch { .. } => "network.checksum_mismatch",
            Self::ClientBuild(_) => "network.client_build",
        };
        Some(code)
    }
}
