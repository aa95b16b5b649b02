#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the pkgrepo resolver
//!
//! One enum per domain (coordinates, metadata, resolution, artifacts,
//! network, configuration), folded into [`Error`] at crate boundaries.
//! Every type is `Clone` so failures can be shared between concurrent
//! waiters and carried inside events.

use std::borrow::Cow;
use std::path::PathBuf;

use thiserror::Error;

pub mod artifact;
pub mod config;
pub mod coordinate;
pub mod metadata;
pub mod network;
pub mod resolution;

pub use artifact::ArtifactError;
pub use config::ConfigError;
pub use coordinate::CoordinateError;
pub use metadata::MetadataError;
pub use network::NetworkError;
pub use resolution::ResolutionError;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("coordinate error: {0}")]
    Coordinate(#[from] CoordinateError),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("internal error: {0}")]
    Internal(String),

    /// `std::io::Error` is not `Clone`, so only its kind and text are kept
    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<PathBuf>,
    },
}

impl Error {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// I/O failure on a known file or directory
    pub fn io_with_path(err: &std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }

    fn domain(&self) -> Option<&dyn UserFacingError> {
        match self {
            Self::Coordinate(err) => Some(err),
            Self::Metadata(err) => Some(err),
            Self::Resolution(err) => Some(err),
            Self::Artifact(err) => Some(err),
            Self::Network(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Internal(_) | Self::Io { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// What the CLI and the event stream show for a failure
pub trait UserFacingError {
    /// One line for the terminal
    fn user_message(&self) -> Cow<'_, str>;

    /// Suggested next step, if there is an obvious one
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether running the same command again may succeed
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable dotted code such as `artifact.integrity`
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        if let Some(err) = self.domain() {
            return err.user_message();
        }
        match self {
            Self::Io {
                message,
                path: Some(path),
                ..
            } => Cow::Owned(format!("{}: {message}", path.display())),
            Self::Io { message, .. } => Cow::Borrowed(message.as_str()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        self.domain().and_then(UserFacingError::user_hint)
    }

    fn is_retryable(&self) -> bool {
        match self.domain() {
            Some(err) => err.is_retryable(),
            None => matches!(self, Self::Io { .. }),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self.domain() {
            Some(err) => err.user_code(),
            None if matches!(self, Self::Io { .. }) => Some("error.io"),
            None => Some("error.internal"),
        }
    }
}
