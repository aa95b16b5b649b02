use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Messages that belong to no single domain, plus whole-session progress
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Something the user should know about; the operation continues
    Warning {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },

    /// Diagnostic detail, only shown with `--debug`
    Debug { message: String },

    /// A session operation (`resolve`, `resolve_all`) began
    OperationStarted {
        operation: String,
        coordinates: Vec<String>,
    },

    /// A session operation produced `artifacts` local paths
    OperationCompleted {
        operation: String,
        artifacts: usize,
        duration_ms: u64,
    },

    /// A session operation failed; no paths were returned
    OperationFailed {
        operation: String,
        failure: FailureContext,
    },
}

impl GeneralEvent {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
            context: None,
        }
    }

    pub fn warning_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::Debug {
            message: message.into(),
        }
    }
}
