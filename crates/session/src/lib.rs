#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Resolution entry points for pkgrepo
//!
//! Wires configuration, repositories, the metadata fetcher, the graph
//! builder and the artifact fetcher into a [`ResolutionSession`].

mod builder;
mod session;

pub use builder::SessionBuilder;
pub use session::ResolutionSession;

use pkgrepo_config::{Config, RepositoryConfig};
use pkgrepo_errors::Error;
use pkgrepo_repository::RemoteRepository;
use pkgrepo_types::Scope;
use std::path::{Path, PathBuf};

/// Resolve `coordinates[0]` with its transitive closure and return the local
/// path of every artifact, root first.
///
/// `None` arguments take the defaults: the runtime classpath, the local
/// repository under `~/.cache/pkgrepo`, and Maven Central as the only
/// remote. An empty scope or remote list counts as unspecified. See [`ResolutionSession::resolve`] for how extra coordinates are
/// treated.
///
/// # Errors
///
/// Returns malformed-coordinate errors before any network activity, then the
/// first metadata, resolution or download failure.
pub async fn resolve<S: AsRef<str>>(
    coordinates: &[S],
    scopes: Option<&[Scope]>,
    local_repo_path: Option<&Path>,
    remotes: Option<&[RemoteRepository]>,
) -> Result<Vec<PathBuf>, Error> {
    if coordinates.is_empty() {
        return Ok(Vec::new());
    }

    let config = config_for(scopes, local_repo_path, remotes);
    SessionBuilder::new(config).build()?.resolve(coordinates).await
}

/// Defaults overridden by the non-empty arguments
fn config_for(
    scopes: Option<&[Scope]>,
    local_repo_path: Option<&Path>,
    remotes: Option<&[RemoteRepository]>,
) -> Config {
    let mut config = Config::default();
    if let Some(scopes) = scopes.filter(|s| !s.is_empty()) {
        config.resolver.scopes = scopes.iter().map(|s| s.as_str().to_string()).collect();
    }
    if let Some(path) = local_repo_path {
        config.paths.local_repo = Some(path.to_path_buf());
    }
    if let Some(remotes) = remotes.filter(|r| !r.is_empty()) {
        config.repositories = remotes
            .iter()
            .map(|r| RepositoryConfig {
                id: r.id().to_string(),
                url: r.url().to_string(),
            })
            .collect();
    }
    config
}
