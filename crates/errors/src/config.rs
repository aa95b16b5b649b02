//! Configuration errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read config file {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("config file {path} is not valid TOML: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("invalid repository entry: {message}")]
    InvalidRepository { message: String },

    #[error("no home directory available to derive {what}")]
    NoHomeDirectory { what: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some(match self {
            Self::Unreadable { .. } => {
                "Pass an existing file with --config or drop the flag to use defaults."
            }
            Self::Parse { .. } | Self::InvalidValue { .. } => {
                "Fix the value named above and run the command again."
            }
            Self::InvalidRepository { .. } => {
                "Each [[repositories]] entry needs a non-empty id and an http(s) or file url."
            }
            Self::NoHomeDirectory { .. } => "Set HOME or pass --local-repo explicitly.",
        })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Unreadable { .. } => "config.unreadable",
            Self::Parse { .. } => "config.parse",
            Self::InvalidValue { .. } => "config.invalid_value",
            Self::InvalidRepository { .. } => "config.invalid_repository",
            Self::NoHomeDirectory { .. } => "config.no_home_directory",
        })
    }
}
