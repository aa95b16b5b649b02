//! Metadata (POM) retrieval and parsing errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum MetadataError {
    /// No remote produced the document. `attempts` holds one `repo-id: cause`
    /// entry per remote tried.
    #[error("metadata not found for {coordinate} (tried: {})", .attempts.join("; "))]
    NotFound {
        coordinate: String,
        attempts: Vec<String>,
    },

    #[error("failed to parse metadata for {coordinate}: {message}")]
    Parse { coordinate: String, message: String },
}

impl UserFacingError for MetadataError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Check the coordinate spelling and that a configured remote hosts it.")
            }
            Self::Parse { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "metadata.not_found",
            Self::Parse { .. } => "metadata.parse",
        };
        Some(code)
    }
}
