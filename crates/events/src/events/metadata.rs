use serde::{Deserialize, Serialize};

/// Metadata document lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MetadataEvent {
    /// Served from the local repository without network access
    CacheHit { coordinate: String, path: String },

    /// Downloaded from a remote and written to the local repository
    Fetched {
        coordinate: String,
        repository: String,
        url: String,
    },

    /// Remote did not have the document; the next remote is tried
    NotFoundIn {
        coordinate: String,
        repository: String,
    },

    /// Transient failure against a remote, another attempt follows
    Retrying {
        url: String,
        attempt: u32,
        max_attempts: u32,
        delay_ms: u64,
        reason: String,
    },
}
