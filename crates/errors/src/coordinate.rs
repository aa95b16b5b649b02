//! Coordinate and scope parsing errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CoordinateError {
    #[error("malformed coordinate '{input}': {reason}")]
    Malformed { input: String, reason: String },

    #[error("unknown scope '{scope}'")]
    UnknownScope { scope: String },

    #[error("malformed exclusion '{input}'")]
    MalformedExclusion { input: String },
}

impl UserFacingError for CoordinateError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Malformed { .. } => {
                Some("Use group:name:version, optionally followed by :extension or :classifier:extension.")
            }
            Self::UnknownScope { .. } => Some("Valid scopes are compile, runtime, test and provided."),
            Self::MalformedExclusion { .. } => Some("Exclusions take the form group:name; either part may be '*'."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Malformed { .. } => "coordinate.malformed",
            Self::UnknownScope { .. } => "coordinate.unknown_scope",
            Self::MalformedExclusion { .. } => "coordinate.malformed_exclusion",
        };
        Some(code)
    }
}
