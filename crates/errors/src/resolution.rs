//! Dependency graph resolution errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    /// `cycle` lists coordinates along the loop, first and last are equal.
    #[error("cyclic dependency: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
}

impl UserFacingError for ResolutionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CyclicDependency { .. } => {
                Some("Exclude one edge of the cycle from the requesting coordinate.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::CyclicDependency { .. } => Some("resolution.cyclic_dependency"),
        }
    }
}
