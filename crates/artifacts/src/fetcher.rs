//! Cached, verified artifact downloads

use crate::locks::PathLocks;
use futures::stream::{self, StreamExt, TryStreamExt};
use pkgrepo_config::{acquire_semaphore_permit, ConcurrencyLimits};
use pkgrepo_errors::{ArtifactError, Error, NetworkError};
use pkgrepo_events::{AppEvent, DownloadEvent, EventEmitter, EventSender};
use pkgrepo_hash::{verify_file, Checksum, ChecksumAlgorithm};
use pkgrepo_net::{download_file, fetch_bytes, write_atomic, NetClient, TransferKind};
use pkgrepo_repository::{with_suffix, RemoteRepository, RepositoryRegistry};
use pkgrepo_types::Coordinate;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Downloads artifacts into the local repository
pub struct ArtifactFetcher {
    registry: Arc<RepositoryRegistry>,
    client: NetClient,
    limits: ConcurrencyLimits,
    locks: PathLocks,
    tx: Option<EventSender>,
}

impl EventEmitter for ArtifactFetcher {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl ArtifactFetcher {
    #[must_use]
    pub fn new(registry: Arc<RepositoryRegistry>, client: NetClient, tx: Option<EventSender>) -> Self {
        Self {
            registry,
            client,
            limits: ConcurrencyLimits::default(),
            locks: PathLocks::new(),
            tx,
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: ConcurrencyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Fetch every coordinate, returning local paths in input order.
    ///
    /// Up to `min(download permits, count)` artifacts are in flight at once.
    /// The first failure fails the batch; artifacts already in place stay
    /// cached.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::NotFound` when no remote has an artifact,
    /// `ArtifactError::Integrity` when a download does not match its
    /// published checksum, and I/O errors from the local repository.
    pub async fn fetch_all(&self, coordinates: &[Coordinate]) -> Result<Vec<PathBuf>, Error> {
        let width = self.limits.download_width(coordinates.len());
        stream::iter(coordinates.iter().map(|c| self.fetch(c)))
            .buffered(width)
            .try_collect()
            .await
    }

    /// Fetch one artifact, serving a verified cached copy when present.
    ///
    /// # Errors
    ///
    /// Same as [`ArtifactFetcher::fetch_all`].
    pub async fn fetch(&self, coordinate: &Coordinate) -> Result<PathBuf, Error> {
        let path = self.registry.resolve_local_path(coordinate);
        let lock = self.locks.lock_for(&path);
        let _guard = lock.lock().await;

        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))?
        {
            if self.cached_copy_is_valid(&path).await? {
                self.emit(AppEvent::Download(DownloadEvent::Cached {
                    coordinate: coordinate.to_string(),
                    path: path.display().to_string(),
                }));
                return Ok(path);
            }
            self.invalidate(coordinate, &path).await?;
        }

        let _permit =
            acquire_semaphore_permit(Arc::clone(&self.limits.downloads), "artifact download")
                .await?;
        self.download(coordinate, &path).await
    }

    /// A cached file without any sidecar is trusted
    async fn cached_copy_is_valid(&self, path: &Path) -> Result<bool, Error> {
        for algorithm in ChecksumAlgorithm::PREFERENCE {
            let sidecar = with_suffix(path, algorithm);
            let text = match tokio::fs::read_to_string(&sidecar).await {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(Error::io_with_path(&e, sidecar)),
            };
            match Checksum::parse_sidecar(algorithm, &text) {
                Some(expected) => return verify_file(path, &expected).await,
                None => self.emit_debug(format!(
                    "ignoring unreadable checksum file {}",
                    sidecar.display()
                )),
            }
        }
        Ok(true)
    }

    async fn invalidate(&self, coordinate: &Coordinate, path: &Path) -> Result<(), Error> {
        remove_if_present(path).await?;
        for algorithm in ChecksumAlgorithm::PREFERENCE {
            remove_if_present(&with_suffix(path, algorithm)).await?;
        }
        self.emit(AppEvent::Download(DownloadEvent::CacheInvalidated {
            coordinate: coordinate.to_string(),
            path: path.display().to_string(),
        }));
        Ok(())
    }

    /// Tries remotes in order. When none has the file, the first transfer
    /// failure is returned; `ArtifactError::NotFound` means every remote
    /// reported the file missing.
    async fn download(&self, coordinate: &Coordinate, path: &Path) -> Result<PathBuf, Error> {
        let mut attempts = Vec::new();
        let mut first_failure: Option<Error> = None;

        for remote in self.registry.remotes() {
            let url = RepositoryRegistry::remote_url(remote, coordinate)?;
            let expected = match self.published_checksum(remote, coordinate).await {
                Ok(expected) => expected,
                Err(e) => {
                    attempts.push(format!("{}: checksum: {e}", remote.id()));
                    first_failure.get_or_insert(e);
                    continue;
                }
            };

            self.emit(AppEvent::Download(DownloadEvent::Started {
                coordinate: coordinate.to_string(),
                url: url.clone(),
                total_size: None,
            }));

            match download_file(&self.client, &url, path, expected.as_ref(), self.tx.as_ref()).await {
                Ok(Some(result)) => {
                    if let Some(expected) = &expected {
                        write_atomic(
                            &with_suffix(path, expected.algorithm()),
                            expected.sidecar_contents().as_bytes(),
                        )
                        .await?;
                    }
                    self.emit(AppEvent::Download(DownloadEvent::Completed {
                        coordinate: coordinate.to_string(),
                        url,
                        path: result.path.display().to_string(),
                        size: result.size,
                        duration_ms: u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
                        checksum: expected.map(|c| c.to_string()),
                    }));
                    return Ok(result.path);
                }
                Ok(None) => attempts.push(format!("{}: not found", remote.id())),
                Err(Error::Network(NetworkError::ChecksumMismatch {
                    url,
                    algorithm,
                    expected,
                    actual,
                })) => {
                    self.emit(AppEvent::Download(DownloadEvent::IntegrityFailed {
                        coordinate: coordinate.to_string(),
                        url,
                        algorithm: algorithm.clone(),
                        expected: expected.clone(),
                        actual: actual.clone(),
                    }));
                    return Err(ArtifactError::Integrity {
                        coordinate: coordinate.to_string(),
                        algorithm,
                        expected,
                        actual,
                    }
                    .into());
                }
                Err(e) => {
                    attempts.push(format!("{}: {e}", remote.id()));
                    first_failure.get_or_insert(e);
                }
            }
        }

        let error = first_failure.unwrap_or_else(|| {
            ArtifactError::NotFound {
                coordinate: coordinate.to_string(),
                attempts,
            }
            .into()
        });
        self.emit(AppEvent::Download(DownloadEvent::Failed {
            coordinate: coordinate.to_string(),
            error: error.to_string(),
        }));
        Err(error)
    }

    /// First parseable sidecar the remote publishes, strongest algorithm first
    async fn published_checksum(
        &self,
        remote: &RemoteRepository,
        coordinate: &Coordinate,
    ) -> Result<Option<Checksum>, Error> {
        for algorithm in ChecksumAlgorithm::PREFERENCE {
            let url = RepositoryRegistry::checksum_url(remote, coordinate, algorithm)?;
            let Some(bytes) =
                fetch_bytes(&self.client, &url, TransferKind::Artifact, self.tx.as_ref()).await?
            else {
                continue;
            };
            if let Some(checksum) = Checksum::parse_sidecar(algorithm, &String::from_utf8_lossy(&bytes)) {
                return Ok(Some(checksum));
            }
            self.emit_debug(format!("ignoring unreadable checksum at {url}"));
        }
        Ok(None)
    }
}

impl std::fmt::Debug for ArtifactFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactFetcher")
            .field("registry", &self.registry)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

async fn remove_if_present(path: &Path) -> Result<(), Error> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}
