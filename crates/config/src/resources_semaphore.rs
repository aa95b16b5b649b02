//! Semaphore utilities for bounding concurrent network work
//!
//! Metadata fetches and artifact downloads draw permits from separate
//! semaphores.

use crate::Config;
use pkgrepo_errors::Error;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Acquire a semaphore permit with proper error handling
///
/// # Arguments
///
/// * `semaphore` - The semaphore to acquire a permit from
/// * `operation` - Description of the operation for error reporting
///
/// # Errors
///
/// Returns an error if the semaphore is closed
pub async fn acquire_semaphore_permit(
    semaphore: Arc<Semaphore>,
    operation: &str,
) -> Result<OwnedSemaphorePermit, Error> {
    semaphore
        .acquire_owned()
        .await
        .map_err(|_| Error::internal(format!("failed to acquire semaphore for {operation}")))
}

/// Create a semaphore with a specified number of permits
///
/// Zero is raised to one.
#[must_use]
pub fn create_semaphore(permits: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(permits.max(1)))
}

/// Permit pools for one resolution session
#[derive(Debug, Clone)]
pub struct ConcurrencyLimits {
    pub metadata: Arc<Semaphore>,
    pub downloads: Arc<Semaphore>,
    metadata_permits: usize,
    download_permits: usize,
}

impl ConcurrencyLimits {
    #[must_use]
    pub fn new(metadata_permits: usize, download_permits: usize) -> Self {
        let metadata_permits = metadata_permits.max(1);
        let download_permits = download_permits.max(1);
        Self {
            metadata: create_semaphore(metadata_permits),
            downloads: create_semaphore(download_permits),
            metadata_permits,
            download_permits,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.resolver.parallel_metadata,
            config.network.parallel_downloads,
        )
    }

    #[must_use]
    pub fn metadata_permits(&self) -> usize {
        self.metadata_permits
    }

    /// Download concurrency for a batch of `count` artifacts.
    #[must_use]
    pub fn download_width(&self, count: usize) -> usize {
        self.download_permits.min(count).max(1)
    }
}

impl Default for ConcurrencyLimits {
    fn default() -> Self {
        Self::new(8, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_permits_bound_concurrency() {
        let limits = ConcurrencyLimits::new(2, 0);
        let first = acquire_semaphore_permit(limits.metadata.clone(), "metadata")
            .await
            .unwrap();
        let _second = acquire_semaphore_permit(limits.metadata.clone(), "metadata")
            .await
            .unwrap();
        assert_eq!(limits.metadata.available_permits(), 0);
        drop(first);
        assert_eq!(limits.metadata.available_permits(), 1);
        assert_eq!(limits.downloads.available_permits(), 1);
    }

    #[test]
    fn test_download_width() {
        let limits = ConcurrencyLimits::default();
        assert_eq!(limits.download_width(3), 3);
        assert_eq!(limits.download_width(50), 8);
        assert_eq!(limits.download_width(0), 1);
    }

    #[tokio::test]
    async fn test_closed_semaphore_errors() {
        let sem = create_semaphore(1);
        sem.close();
        assert!(acquire_semaphore_permit(sem, "closed").await.is_err());
    }
}
