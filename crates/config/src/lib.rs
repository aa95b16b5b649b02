#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for pkgrepo
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/pkgrepo/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod resources_semaphore;

pub use resources_semaphore::{acquire_semaphore_permit, create_semaphore, ConcurrencyLimits};

use pkgrepo_errors::{ConfigError, Error};
use pkgrepo_types::Scope;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default = "default_repositories")]
    pub repositories: Vec<RepositoryConfig>,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub local_repo: Option<PathBuf>,
}

/// One `[[repositories]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub id: String,
    pub url: String,
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_parallel_metadata")]
    pub parallel_metadata: usize,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_chunk_timeout")]
    pub chunk_timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    #[serde(default = "default_parallel_downloads")]
    pub parallel_downloads: usize,
}

// Default implementations

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathConfig::default(),
            repositories: default_repositories(),
            resolver: ResolverConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            scopes: default_scopes(),
            parallel_metadata: default_parallel_metadata(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            chunk_timeout: default_chunk_timeout(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            parallel_downloads: default_parallel_downloads(),
        }
    }
}

// Default value functions for serde
fn default_repositories() -> Vec<RepositoryConfig> {
    vec![RepositoryConfig {
        id: constants::CENTRAL_ID.to_string(),
        url: constants::CENTRAL_URL.to_string(),
    }]
}

fn default_scopes() -> Vec<String> {
    vec![constants::DEFAULT_SCOPE.to_string()]
}

fn default_parallel_metadata() -> usize {
    8
}

fn default_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_chunk_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    250
}

fn default_max_retry_delay_ms() -> u64 {
    5000
}

fn default_parallel_downloads() -> usize {
    8
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NoHomeDirectory {
            what: "the config file path".to_string(),
        })?;
        Ok(config_dir
            .join(constants::CONFIG_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Unreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let Ok(config_path) = Self::default_path() else {
            return Ok(Self::default());
        };

        if fs::try_exists(&config_path).await.unwrap_or(false) {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(local_repo) = std::env::var(constants::ENV_LOCAL_REPO) {
            if local_repo.trim().is_empty() {
                return Err(invalid(constants::ENV_LOCAL_REPO, local_repo));
            }
            self.paths.local_repo = Some(PathBuf::from(local_repo));
        }

        if let Ok(scopes) = std::env::var(constants::ENV_SCOPES) {
            let parsed: Vec<String> = scopes
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if parsed.is_empty() || parsed.iter().any(|s| s.parse::<Scope>().is_err()) {
                return Err(invalid(constants::ENV_SCOPES, scopes));
            }
            self.resolver.scopes = parsed;
        }

        if let Ok(retries) = std::env::var(constants::ENV_RETRIES) {
            self.network.retries = retries
                .parse()
                .map_err(|_| invalid(constants::ENV_RETRIES, retries.clone()))?;
        }

        if let Ok(timeout) = std::env::var(constants::ENV_TIMEOUT) {
            self.network.timeout = match timeout.parse() {
                Ok(0) | Err(_) => return Err(invalid(constants::ENV_TIMEOUT, timeout)),
                Ok(seconds) => seconds,
            };
        }

        if let Ok(downloads) = std::env::var(constants::ENV_PARALLEL_DOWNLOADS) {
            self.network.parallel_downloads = match downloads.parse() {
                Ok(0) | Err(_) => {
                    return Err(invalid(constants::ENV_PARALLEL_DOWNLOADS, downloads))
                }
                Ok(n) => n,
            };
        }

        Ok(())
    }

    /// Check values that deserialize fine but cannot be used
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unknown scopes or zero limits.
    pub fn validate(&self) -> Result<(), Error> {
        for scope in &self.resolver.scopes {
            if scope.parse::<Scope>().is_err() {
                return Err(invalid("resolver.scopes", scope.clone()));
            }
        }
        if self.resolver.parallel_metadata == 0 {
            return Err(invalid("resolver.parallel_metadata", "0".to_string()));
        }
        if self.network.parallel_downloads == 0 {
            return Err(invalid("network.parallel_downloads", "0".to_string()));
        }
        if self.network.timeout == 0 {
            return Err(invalid("network.timeout", "0".to_string()));
        }
        for repo in &self.repositories {
            if repo.id.trim().is_empty() || repo.url.trim().is_empty() {
                return Err(ConfigError::InvalidRepository {
                    message: format!("'{}' needs both id and url", repo.id),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Get the local repository path (with default)
    ///
    /// # Errors
    ///
    /// Returns an error when no path is configured and the home directory
    /// cannot be determined.
    pub fn local_repo_path(&self) -> Result<PathBuf, Error> {
        if let Some(path) = &self.paths.local_repo {
            return Ok(path.clone());
        }
        let home = dirs::home_dir().ok_or_else(|| ConfigError::NoHomeDirectory {
            what: "the local repository path".to_string(),
        })?;
        Ok(home.join(constants::DEFAULT_LOCAL_REPO))
    }

    /// Scopes as typed values; an empty list means the default `runtime`
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown scope name.
    pub fn scopes(&self) -> Result<Vec<Scope>, Error> {
        if self.resolver.scopes.is_empty() {
            return Ok(vec![Scope::Runtime]);
        }
        self.resolver
            .scopes
            .iter()
            .map(|s| s.parse::<Scope>().map_err(Error::from))
            .collect()
    }

    /// Remote repositories in lookup order; an empty list means Maven Central
    #[must_use]
    pub fn remote_repositories(&self) -> Cow<'_, [RepositoryConfig]> {
        if self.repositories.is_empty() {
            Cow::Owned(default_repositories())
        } else {
            Cow::Borrowed(&self.repositories)
        }
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.network.connect_timeout)
    }

    #[must_use]
    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_secs(self.network.chunk_timeout)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.network.retry_delay_ms)
    }

    #[must_use]
    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.network.max_retry_delay_ms)
    }
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}
