//! Streaming downloads into place with checksum verification
//!
//! Bytes are streamed into a temporary file in the destination directory,
//! hashed on the way, synced, and renamed over the destination. Readers of
//! the destination never see a partial file; a failed or mismatching
//! transfer leaves nothing behind.

use crate::client::{map_reqwest_error, NetClient};
use crate::retry::{status_error, with_retries, TransferKind};
use crate::{file_url_path, is_not_found, validate_url};
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use pkgrepo_errors::{Error, NetworkError};
use pkgrepo_events::EventSender;
use pkgrepo_hash::{Checksum, ChecksumAlgorithm};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;

/// Result of a download operation
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub size: u64,
    /// Digest of the written bytes; the expected algorithm when one was given
    pub checksum: Checksum,
    pub duration: Duration,
}

type ChunkStream<'a> = BoxStream<'a, Result<Bytes, NetworkError>>;

/// Download `url` to `dest`, verifying against `expected` when given.
///
/// Returns `Ok(None)` when the source does not exist (HTTP 404/410 or a
/// missing `file://` path). Transient failures are retried per the client's
/// retry configuration. A checksum mismatch is never retried.
///
/// # Errors
///
/// Returns `NetworkError::ChecksumMismatch` when the bytes do not match
/// `expected`, other network errors once retries are exhausted, and I/O
/// errors from the local filesystem.
pub async fn download_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    expected: Option<&Checksum>,
    tx: Option<&EventSender>,
) -> Result<Option<DownloadResult>, Error> {
    let parsed = validate_url(url)?;
    let algorithm = expected.map_or(ChecksumAlgorithm::Sha256, Checksum::algorithm);
    let chunk_timeout = client.config().chunk_timeout;

    let dir = dest
        .parent()
        .ok_or_else(|| Error::internal(format!("{} has no parent directory", dest.display())))?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::io_with_path(&e, dir))?;

    if parsed.scheme() == "file" {
        let source = file_url_path(&parsed)?;
        let data = match tokio::fs::read(&source).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io_with_path(&e, source)),
        };
        let stream: ChunkStream<'_> =
            futures::stream::once(async move { Ok::<_, NetworkError>(Bytes::from(data)) }).boxed();
        let target = Target {
            url,
            dest,
            algorithm,
            expected,
            chunk_timeout,
        };
        return write_verified(stream, &target).await.map(Some);
    }

    with_retries(
        &client.config().retry,
        url,
        TransferKind::Artifact,
        tx,
        || async move {
            let response = client.get_once(url).await?;
            let status = response.status();
            if is_not_found(status) {
                return Ok(None);
            }
            if !status.is_success() {
                return Err(status_error(status, url));
            }
            let stream: ChunkStream<'_> = response
                .bytes_stream()
                .map(move |chunk| chunk.map_err(|e| map_reqwest_error(url, &e)))
                .boxed();
            let target = Target {
                url,
                dest,
                algorithm,
                expected,
                chunk_timeout,
            };
            write_verified(stream, &target).await.map(Some)
        },
    )
    .await
}

/// Write `data` to `dest` through a temporary sibling and an atomic rename.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created or the file
/// cannot be written or renamed.
pub async fn write_atomic(dest: &Path, data: &[u8]) -> Result<(), Error> {
    let dir = dest
        .parent()
        .ok_or_else(|| Error::internal(format!("{} has no parent directory", dest.display())))?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::io_with_path(&e, dir))?;

    let temp = tempfile::Builder::new()
        .prefix(".pkgrepo-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| Error::io_with_path(&e, dir))?;
    let (std_file, temp_path) = temp.into_parts();
    let mut file = tokio::fs::File::from_std(std_file);
    file.write_all(data)
        .await
        .map_err(|e| Error::io_with_path(&e, &*temp_path))?;
    file.sync_all()
        .await
        .map_err(|e| Error::io_with_path(&e, &*temp_path))?;
    drop(file);

    temp_path
        .persist(dest)
        .map_err(|e| Error::io_with_path(&e.error, dest))?;
    Ok(())
}

struct Target<'a> {
    url: &'a str,
    dest: &'a Path,
    algorithm: ChecksumAlgorithm,
    expected: Option<&'a Checksum>,
    chunk_timeout: Duration,
}

async fn write_verified(
    mut stream: ChunkStream<'_>,
    target: &Target<'_>,
) -> Result<DownloadResult, Error> {
    let started = Instant::now();
    let dir = target
        .dest
        .parent()
        .ok_or_else(|| Error::internal("download target has no parent directory"))?;

    let temp = tempfile::Builder::new()
        .prefix(".pkgrepo-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| Error::io_with_path(&e, dir))?;
    // The path guard deletes the temp file on every early return below
    let (std_file, temp_path) = temp.into_parts();
    let mut file = tokio::fs::File::from_std(std_file);
    let mut hasher = target.algorithm.hasher();
    let mut size = 0u64;

    loop {
        match tokio::time::timeout(target.chunk_timeout, stream.next()).await {
            Ok(Some(chunk)) => {
                let chunk = chunk?;
                hasher.update(&chunk);
                file.write_all(&chunk)
                    .await
                    .map_err(|e| Error::io_with_path(&e, &*temp_path))?;
                size += chunk.len() as u64;
            }
            Ok(None) => break,
            Err(_) => {
                return Err(NetworkError::Timeout {
                    url: target.url.to_string(),
                }
                .into());
            }
        }
    }

    file.flush()
        .await
        .map_err(|e| Error::io_with_path(&e, &*temp_path))?;
    file.sync_all()
        .await
        .map_err(|e| Error::io_with_path(&e, &*temp_path))?;
    drop(file);

    let actual = hasher.finalize();
    if let Some(expected) = target.expected {
        if actual != *expected {
            drop(temp_path);
            return Err(NetworkError::ChecksumMismatch {
                url: target.url.to_string(),
                algorithm: expected.algorithm().to_string(),
                expected: expected.to_hex().to_string(),
                actual: actual.to_hex().to_string(),
            }
            .into());
        }
    }

    temp_path
        .persist(target.dest)
        .map_err(|e| Error::io_with_path(&e.error, target.dest))?;

    Ok(DownloadResult {
        path: target.dest.to_path_buf(),
        size,
        checksum: actual,
        duration: started.elapsed(),
    })
}
