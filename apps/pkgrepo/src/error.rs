//! CLI error handling

use std::fmt;

use pkgrepo_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Resolution, configuration or download failure from the libraries
    Pkgrepo(pkgrepo_errors::Error),
    /// Writing results to stdout failed
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Pkgrepo(e) => {
                write!(f, "{}", e.user_message())?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Pkgrepo(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl CliError {
    /// Stable code for JSON error output
    pub fn code(&self) -> Option<&'static str> {
        match self {
            CliError::Pkgrepo(e) => e.user_code(),
            CliError::Io(_) => None,
        }
    }
}

impl From<pkgrepo_errors::Error> for CliError {
    fn from(e: pkgrepo_errors::Error) -> Self {
        CliError::Pkgrepo(e)
    }
}

impl From<pkgrepo_errors::ConfigError> for CliError {
    fn from(e: pkgrepo_errors::ConfigError) -> Self {
        CliError::Pkgrepo(e.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
