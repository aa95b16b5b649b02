//! Retry logic and backoff calculations for transfers

use pkgrepo_errors::{Error, NetworkError};
use pkgrepo_events::{AppEvent, DownloadEvent, EventEmitter, EventSender, MetadataEvent};
use std::future::Future;
use std::time::Duration;

/// Retry configuration for transfers
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Additional attempts after the first one
    pub max_retries: u32,
    /// Initial backoff delay
    pub initial_delay: Duration,
    /// Maximum backoff delay
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

/// What is being transferred; selects the event emitted on retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Metadata,
    Artifact,
}

/// Calculate exponential backoff delay with jitter
pub(crate) fn calculate_backoff_delay(retry_config: &RetryConfig, attempt: u32) -> Duration {
    // Precision loss acceptable for backoff calculations
    #[allow(clippy::cast_precision_loss)]
    let base_delay = retry_config
        .initial_delay
        .as_millis()
        .min(u128::from(u64::MAX)) as f64;
    #[allow(clippy::cast_precision_loss)]
    let max_delay = retry_config.max_delay.as_millis().min(u128::from(u64::MAX)) as f64;

    // Retry attempts are small, so this cast is safe
    #[allow(clippy::cast_possible_wrap)]
    let exponent = attempt.saturating_sub(1).min(30) as i32;
    let delay = (base_delay * retry_config.backoff_multiplier.powi(exponent)).min(max_delay);

    let jitter = delay * retry_config.jitter_factor * (rand::random::<f64>() - 0.5);
    // max(0.0) ensures non-negative, round() handles fractional part
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let final_delay = (delay + jitter).max(0.0).round() as u64;

    Duration::from_millis(final_delay)
}

fn is_transient(error: &Error) -> bool {
    match error {
        Error::Network(err) => err.is_transient(),
        _ => false,
    }
}

/// Run `attempt` until it succeeds, fails permanently, or retries run out.
///
/// Only transient network errors are retried; everything else is returned
/// on first occurrence.
pub(crate) async fn with_retries<T, F, Fut>(
    retry: &RetryConfig,
    url: &str,
    kind: TransferKind,
    tx: Option<&EventSender>,
    mut attempt: F,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let max_attempts = retry.max_retries.saturating_add(1);
    let mut tries = 0u32;

    loop {
        tries += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if tries < max_attempts && is_transient(&e) => {
                let delay = calculate_backoff_delay(retry, tries);
                let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                let notice = match kind {
                    TransferKind::Metadata => AppEvent::Metadata(MetadataEvent::Retrying {
                        url: url.to_string(),
                        attempt: tries,
                        max_attempts,
                        delay_ms,
                        reason: e.to_string(),
                    }),
                    TransferKind::Artifact => AppEvent::Download(DownloadEvent::Retrying {
                        url: url.to_string(),
                        attempt: tries,
                        max_attempts,
                        delay_ms,
                        reason: e.to_string(),
                    }),
                };
                if let Some(tx) = tx {
                    tx.emit(notice);
                }
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Map an unsuccessful HTTP status to an error
pub(crate) fn status_error(status: reqwest::StatusCode, url: &str) -> Error {
    NetworkError::HttpError {
        status: status.as_u16(),
        url: url.to_string(),
    }
    .into()
}
