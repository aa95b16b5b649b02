//! In-process locks keyed by destination path

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One async mutex per local artifact path.
///
/// Fetches of the same path are serialized; different paths never contend.
/// Entries live as long as the owning fetcher.
#[derive(Debug, Default)]
pub struct PathLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl PathLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex guarding `path`, created on first use
    #[must_use]
    pub fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(path.to_path_buf()).or_default().value())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
