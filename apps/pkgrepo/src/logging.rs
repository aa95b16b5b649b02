//! Structured logging integration for events
//!
//! Library crates report progress as `AppEvent`s; this module turns each
//! event into a tracing record with structured fields at the level the
//! event declares.

use pkgrepo_events::{AppEvent, DownloadEvent, GeneralEvent, MetadataEvent, ResolverEvent};
use tracing::{debug, error, info, warn};

/// Initialize the tracing subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise `--debug` selects debug for the
/// pkgrepo crates and the default is info.
pub fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "info,pkgrepo=debug"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json_mode {
        builder.json().init();
    } else {
        builder.with_target(debug_enabled).init();
    }
}

/// Log an `AppEvent` through tracing with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let target = event.log_target();
    match event {
        AppEvent::General(general) => log_general(general, target),
        AppEvent::Metadata(metadata) => log_metadata(metadata, target),
        AppEvent::Resolver(resolver) => log_resolver(resolver, target),
        AppEvent::Download(download) => log_download(download, target),
    }
}

fn log_general(event: &GeneralEvent, target: &str) {
    match event {
        GeneralEvent::Warning { message, context } => {
            warn!(source = target, context = ?context, "{message}");
        }
        GeneralEvent::Debug { message } => {
            debug!(source = target, "{message}");
        }
        GeneralEvent::OperationStarted {
            operation,
            coordinates,
        } => {
            info!(source = target, operation = %operation, coordinates = ?coordinates, "Operation started");
        }
        GeneralEvent::OperationCompleted {
            operation,
            artifacts,
            duration_ms,
        } => {
            info!(
                source = target,
                operation = %operation,
                artifacts,
                duration_ms,
                "Operation completed"
            );
        }
        GeneralEvent::OperationFailed { operation, failure } => {
            error!(
                source = target,
                operation = %operation,
                retryable = failure.retryable,
                code = ?failure.code,
                hint = ?failure.hint,
                "{}",
                failure.message
            );
        }
    }
}

fn log_metadata(event: &MetadataEvent, target: &str) {
    match event {
        MetadataEvent::CacheHit { coordinate, path } => {
            debug!(source = target, coordinate = %coordinate, path = %path, "Metadata cache hit");
        }
        MetadataEvent::Fetched {
            coordinate,
            repository,
            url,
        } => {
            debug!(
                source = target,
                coordinate = %coordinate,
                repository = %repository,
                url = %url,
                "Metadata fetched"
            );
        }
        MetadataEvent::NotFoundIn {
            coordinate,
            repository,
        } => {
            debug!(
                source = target,
                coordinate = %coordinate,
                repository = %repository,
                "Metadata not in repository"
            );
        }
        MetadataEvent::Retrying {
            url,
            attempt,
            max_attempts,
            delay_ms,
            reason,
        } => {
            warn!(
                source = target,
                url = %url,
                attempt,
                max_attempts,
                delay_ms,
                reason = %reason,
                "Retrying metadata request"
            );
        }
    }
}

fn log_resolver(event: &ResolverEvent, target: &str) {
    match event {
        ResolverEvent::Started { roots, scopes } => {
            info!(source = target, roots = ?roots, scopes = %scopes, "Resolution started");
        }
        ResolverEvent::NodeResolved {
            coordinate,
            depth,
            parent,
        } => {
            debug!(
                source = target,
                coordinate = %coordinate,
                depth,
                parent = ?parent,
                "Node resolved"
            );
        }
        ResolverEvent::ConflictMediated {
            module,
            winner,
            loser,
            requested_by,
        } => {
            debug!(
                source = target,
                module = %module,
                winner = %winner,
                loser = %loser,
                requested_by = %requested_by,
                "Version conflict mediated"
            );
        }
        ResolverEvent::Completed {
            root,
            nodes,
            mediations,
            duration_ms,
        } => {
            info!(
                source = target,
                root = %root,
                nodes,
                mediations,
                duration_ms,
                "Resolution completed"
            );
        }
        ResolverEvent::Failed { root, failure } => {
            error!(
                source = target,
                root = %root,
                retryable = failure.retryable,
                code = ?failure.code,
                hint = ?failure.hint,
                "Resolution failed: {}",
                failure.message
            );
        }
    }
}

fn log_download(event: &DownloadEvent, target: &str) {
    match event {
        DownloadEvent::Cached { coordinate, path } => {
            debug!(source = target, coordinate = %coordinate, path = %path, "Artifact cached");
        }
        DownloadEvent::Started {
            coordinate,
            url,
            total_size,
        } => {
            debug!(
                source = target,
                coordinate = %coordinate,
                url = %url,
                total_size = ?total_size,
                "Download started"
            );
        }
        DownloadEvent::Completed {
            coordinate,
            url,
            path,
            size,
            duration_ms,
            checksum,
        } => {
            info!(
                source = target,
                coordinate = %coordinate,
                url = %url,
                path = %path,
                size,
                duration_ms,
                checksum = ?checksum,
                "Download completed"
            );
        }
        DownloadEvent::Retrying {
            url,
            attempt,
            max_attempts,
            delay_ms,
            reason,
        } => {
            warn!(
                source = target,
                url = %url,
                attempt,
                max_attempts,
                delay_ms,
                reason = %reason,
                "Retrying download"
            );
        }
        DownloadEvent::IntegrityFailed {
            coordinate,
            url,
            algorithm,
            expected,
            actual,
        } => {
            error!(
                source = target,
                coordinate = %coordinate,
                url = %url,
                algorithm = %algorithm,
                expected = %expected,
                actual = %actual,
                "Checksum mismatch, download discarded"
            );
        }
        DownloadEvent::CacheInvalidated { coordinate, path } => {
            warn!(
                source = target,
                coordinate = %coordinate,
                path = %path,
                "Cached artifact failed verification"
            );
        }
        DownloadEvent::Failed { coordinate, error } => {
            error!(source = target, coordinate = %coordinate, error = %error, "Download failed");
        }
    }
}
