use serde::{Deserialize, Serialize};

use pkgrepo_errors::UserFacingError;

/// What went wrong, in the shape of [`UserFacingError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    /// e.g. `artifact.integrity`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(str::to_string),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(str::to_string),
            retryable: error.is_retryable(),
        }
    }
}

pub mod download;
pub mod general;
pub mod metadata;
pub mod resolver;

pub use download::*;
pub use general::*;
pub use metadata::*;
pub use resolver::*;

/// Every event a library crate can send, tagged by domain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings, debug detail and whole-session progress
    General(GeneralEvent),

    /// Metadata document lookups
    Metadata(MetadataEvent),

    /// Dependency graph construction
    Resolver(ResolverEvent),

    /// Artifact downloads and cache hits
    Download(DownloadEvent),
}

impl AppEvent {
    /// Level the CLI logs this event at
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::OperationFailed { .. })
            | Self::Download(DownloadEvent::Failed { .. } | DownloadEvent::IntegrityFailed { .. })
            | Self::Resolver(ResolverEvent::Failed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Metadata(MetadataEvent::Retrying { .. })
            | Self::Download(
                DownloadEvent::Retrying { .. } | DownloadEvent::CacheInvalidated { .. },
            ) => Level::WARN,

            Self::General(GeneralEvent::Debug { .. })
            | Self::Metadata(_)
            | Self::Resolver(
                ResolverEvent::NodeResolved { .. } | ResolverEvent::ConflictMediated { .. },
            )
            | Self::Download(DownloadEvent::Cached { .. } | DownloadEvent::Started { .. }) => {
                Level::DEBUG
            }

            _ => Level::INFO,
        }
    }

    /// Value of the `source` field in log records
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "pkgrepo::events::general",
            Self::Metadata(_) => "pkgrepo::events::metadata",
            Self::Resolver(_) => "pkgrepo::events::resolver",
            Self::Download(_) => "pkgrepo::events::download",
        }
    }
}
