#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Repository registry for pkgrepo
//!
//! Holds the ordered list of remote repositories and the local cache root,
//! and computes where a coordinate lives in either. Everything here is
//! pure path arithmetic; no I/O happens after construction.

use pkgrepo_config::{constants, Config};
use pkgrepo_errors::{ConfigError, Error, NetworkError};
use pkgrepo_hash::ChecksumAlgorithm;
use pkgrepo_types::Coordinate;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Extension of metadata documents
pub const METADATA_EXTENSION: &str = "pom";

/// A named remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    id: String,
    url: Url,
}

impl RemoteRepository {
    /// Create a remote, normalizing the base URL to end with `/`.
    ///
    /// # Errors
    ///
    /// Returns an error when the id is empty, the URL does not parse, or the
    /// scheme is not http, https or file.
    pub fn new(id: impl Into<String>, url: &str) -> Result<Self, Error> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "repository id".to_string(),
                value: id,
            }
            .into());
        }

        let mut normalized = url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let url = Url::parse(&normalized)
            .map_err(|e| NetworkError::InvalidUrl(format!("{normalized}: {e}")))?;
        match url.scheme() {
            "http" | "https" | "file" => Ok(Self { id, url }),
            scheme => Err(NetworkError::UnsupportedProtocol {
                scheme: scheme.to_string(),
            }
            .into()),
        }
    }

    /// Maven Central
    ///
    /// # Errors
    ///
    /// Never fails in practice; the central URL is a constant.
    pub fn central() -> Result<Self, Error> {
        Self::new(constants::CENTRAL_ID, constants::CENTRAL_URL)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Base URL, always ending with `/`
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for RemoteRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}

/// Local cache root plus remotes in lookup order
#[derive(Debug, Clone)]
pub struct RepositoryRegistry {
    local_root: PathBuf,
    remotes: Vec<RemoteRepository>,
}

impl RepositoryRegistry {
    /// Create a registry. A relative cache root is made absolute against the
    /// current directory so every returned path is absolute.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined for a
    /// relative cache root.
    pub fn new(
        local_root: impl Into<PathBuf>,
        remotes: Vec<RemoteRepository>,
    ) -> Result<Self, Error> {
        let local_root = local_root.into();
        let local_root =
            std::path::absolute(&local_root).map_err(|e| Error::io_with_path(&e, &local_root))?;
        Ok(Self {
            local_root,
            remotes,
        })
    }

    /// Build from the `[paths]` and `[[repositories]]` sections
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid repository entry or when no local
    /// repository path can be determined.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let remotes = config
            .remote_repositories()
            .iter()
            .map(|repo| RemoteRepository::new(repo.id.clone(), &repo.url))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(config.local_repo_path()?, remotes)
    }

    #[must_use]
    pub fn remotes(&self) -> &[RemoteRepository] {
        &self.remotes
    }

    #[must_use]
    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    /// `{group/as/path}/{name}/{version}/{file_name}`
    #[must_use]
    pub fn relative_path(coordinate: &Coordinate) -> String {
        format!(
            "{}/{}/{}/{}",
            coordinate.group_path(),
            coordinate.name(),
            coordinate.version(),
            coordinate.file_name()
        )
    }

    #[must_use]
    pub fn resolve_local_path(&self, coordinate: &Coordinate) -> PathBuf {
        let mut path = self.local_root.clone();
        path.extend(Self::relative_path(coordinate).split('/'));
        path
    }

    /// Absolute URL of `coordinate` inside `repo`
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::InvalidUrl` if the joined URL is invalid, which
    /// only happens for coordinates containing URL-reserved characters.
    pub fn remote_url(repo: &RemoteRepository, coordinate: &Coordinate) -> Result<String, Error> {
        Self::join(repo, &Self::relative_path(coordinate))
    }

    /// The metadata document of a coordinate: same version, `pom`, no classifier
    #[must_use]
    pub fn metadata_coordinate(coordinate: &Coordinate) -> Coordinate {
        coordinate
            .with_classifier(None)
            .with_extension(METADATA_EXTENSION)
    }

    #[must_use]
    pub fn checksum_path(&self, coordinate: &Coordinate, algorithm: ChecksumAlgorithm) -> PathBuf {
        with_suffix(&self.resolve_local_path(coordinate), algorithm)
    }

    /// URL of the checksum sidecar of `coordinate` inside `repo`
    ///
    /// # Errors
    ///
    /// Same as [`RepositoryRegistry::remote_url`].
    pub fn checksum_url(
        repo: &RemoteRepository,
        coordinate: &Coordinate,
        algorithm: ChecksumAlgorithm,
    ) -> Result<String, Error> {
        Self::join(
            repo,
            &format!("{}.{}", Self::relative_path(coordinate), algorithm.extension()),
        )
    }

    fn join(repo: &RemoteRepository, relative: &str) -> Result<String, Error> {
        repo.url
            .join(relative)
            .map(String::from)
            .map_err(|e| NetworkError::InvalidUrl(format!("{}{relative}: {e}", repo.url)).into())
    }
}

/// `path` with `.{algorithm}` appended to its file name
#[must_use]
pub fn with_suffix(path: &Path, algorithm: ChecksumAlgorithm) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(algorithm.extension());
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RepositoryRegistry {
        RepositoryRegistry::new(
            "/cache",
            vec![
                RemoteRepository::new("central", "https://repo1.maven.org/maven2").unwrap(),
                RemoteRepository::new("local", "file:///srv/repo/").unwrap(),
            ],
        )
        .unwrap()
    }

    fn log4j() -> Coordinate {
        Coordinate::parse("org.apache.logging.log4j:log4j-core:2.20.0").unwrap()
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let repo = RemoteRepository::new("a", "https://example.com/repo").unwrap();
        assert_eq!(repo.url().as_str(), "https://example.com/repo/");
        let repo = RemoteRepository::new("a", "https://example.com/repo/").unwrap();
        assert_eq!(repo.url().as_str(), "https://example.com/repo/");
    }

    #[test]
    fn test_rejects_unsupported_schemes() {
        assert!(matches!(
            RemoteRepository::new("ftp", "ftp://example.com/"),
            Err(Error::Network(NetworkError::UnsupportedProtocol { .. }))
        ));
        assert!(RemoteRepository::new("", "https://example.com/").is_err());
        assert!(RemoteRepository::new("bad", "::not a url").is_err());
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            RepositoryRegistry::relative_path(&log4j()),
            "org/apache/logging/log4j/log4j-core/2.20.0/log4j-core-2.20.0.jar"
        );
        let sources = log4j().with_classifier(Some("sources"));
        assert_eq!(
            RepositoryRegistry::relative_path(&sources),
            "org/apache/logging/log4j/log4j-core/2.20.0/log4j-core-2.20.0-sources.jar"
        );
    }

    #[test]
    fn test_local_and_remote_locations() {
        let registry = registry();
        assert_eq!(
            registry.resolve_local_path(&log4j()),
            PathBuf::from("/cache/org/apache/logging/log4j/log4j-core/2.20.0/log4j-core-2.20.0.jar")
        );
        assert_eq!(
            RepositoryRegistry::remote_url(&registry.remotes()[0], &log4j()).unwrap(),
            "https://repo1.maven.org/maven2/org/apache/logging/log4j/log4j-core/2.20.0/log4j-core-2.20.0.jar"
        );
        assert_eq!(
            RepositoryRegistry::remote_url(&registry.remotes()[1], &log4j()).unwrap(),
            "file:///srv/repo/org/apache/logging/log4j/log4j-core/2.20.0/log4j-core-2.20.0.jar"
        );
    }

    #[test]
    fn test_metadata_coordinate_drops_classifier() {
        let tests = Coordinate::parse("g:n:1.0:tests:jar").unwrap();
        let pom = RepositoryRegistry::metadata_coordinate(&tests);
        assert_eq!(pom.to_string(), "g:n:1.0:pom");
        assert_eq!(pom.file_name(), "n-1.0.pom");
    }

    #[test]
    fn test_checksum_locations() {
        let registry = registry();
        let coordinate = Coordinate::parse("g:n:1").unwrap();
        assert_eq!(
            registry.checksum_path(&coordinate, ChecksumAlgorithm::Sha1),
            PathBuf::from("/cache/g/n/1/n-1.jar.sha1")
        );
        assert!(
            RepositoryRegistry::checksum_url(&registry.remotes()[0], &coordinate, ChecksumAlgorithm::Sha256)
                .unwrap()
                .ends_with("/g/n/1/n-1.jar.sha256")
        );
    }

    #[test]
    fn test_relative_root_becomes_absolute() {
        let registry = RepositoryRegistry::new("relative/cache", Vec::new()).unwrap();
        assert!(registry.local_root().is_absolute());
    }

    #[test]
    fn test_from_config_defaults_to_central() {
        let mut config = Config::default();
        config.paths.local_repo = Some(PathBuf::from("/tmp/pkgrepo-test"));
        let registry = RepositoryRegistry::from_config(&config).unwrap();
        assert_eq!(registry.remotes().len(), 1);
        assert_eq!(registry.remotes()[0].id(), "central");
        assert_eq!(registry.local_root(), Path::new("/tmp/pkgrepo-test"));
    }

    #[test]
    fn test_empty_repository_list_uses_central() {
        let mut config = Config::default();
        config.paths.local_repo = Some(PathBuf::from("/tmp/pkgrepo-test"));
        config.repositories.clear();
        let registry = RepositoryRegistry::from_config(&config).unwrap();
        let ids: Vec<&str> = registry.remotes().iter().map(RemoteRepository::id).collect();
        assert_eq!(ids, vec!["central"]);
    }

    #[test]
    fn test_local_paths_stay_under_root() {
        use std::path::Component;

        let registry = registry();
        for text in ["g:a:1", "org.example:lib:1.0:sources:jar", "g:a:1:tar.gz"] {
            let coordinate = Coordinate::parse(text).unwrap();
            let path = registry.resolve_local_path(&coordinate);
            assert!(path.starts_with(registry.local_root()), "{text} -> {}", path.display());
            assert!(!path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::CurDir)));
        }
        assert!(Coordinate::parse("g:a:../../../../../tmp/escaped").is_err());
    }
}
