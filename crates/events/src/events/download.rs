use serde::{Deserialize, Serialize};

/// Download-specific events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Artifact already present and valid in the local repository
    Cached { coordinate: String, path: String },

    /// Download started
    Started {
        coordinate: String,
        url: String,
        total_size: Option<u64>,
    },

    /// Download completed and moved into place
    Completed {
        coordinate: String,
        url: String,
        path: String,
        size: u64,
        duration_ms: u64,
        checksum: Option<String>,
    },

    /// Transient failure, another attempt follows
    Retrying {
        url: String,
        attempt: u32,
        max_attempts: u32,
        delay_ms: u64,
        reason: String,
    },

    /// Downloaded bytes did not match the published checksum
    IntegrityFailed {
        coordinate: String,
        url: String,
        algorithm: String,
        expected: String,
        actual: String,
    },

    /// Cached copy failed verification and was removed
    CacheInvalidated { coordinate: String, path: String },

    /// Download failed for good
    Failed { coordinate: String, error: String },
}
