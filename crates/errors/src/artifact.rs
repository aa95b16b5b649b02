//! Artifact download errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ArtifactError {
    #[error("artifact not found for {coordinate} (tried: {})", .attempts.join("; "))]
    NotFound {
        coordinate: String,
        attempts: Vec<String>,
    },

    #[error("{algorithm} mismatch for {coordinate}: expected {expected}, got {actual}")]
    Integrity {
        coordinate: String,
        algorithm: String,
        expected: String,
        actual: String,
    },
}

impl UserFacingError for ArtifactError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Verify the remote repositories list for this coordinate."),
            Self::Integrity { .. } => {
                Some("The corrupt download was discarded; rerunning fetches it again.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "artifact.not_found",
            Self::Integrity { .. } => "artifact.integrity",
        };
        Some(code)
    }
}
