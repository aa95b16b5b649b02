//! HTTP client with connection pooling

use crate::retry::RetryConfig;
use pkgrepo_config::Config;
use pkgrepo_errors::{Error, NetworkError};
use reqwest::{Client, Response};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Whole-request bound, body included
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Longest silence tolerated between two body chunks
    pub chunk_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub retry: RetryConfig,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(15),
            chunk_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 8,
            retry: RetryConfig::default(),
            user_agent: pkgrepo_config::constants::USER_AGENT.to_string(),
        }
    }
}

impl NetConfig {
    /// Derive client settings from the `[network]` section
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.request_timeout(),
            connect_timeout: config.connect_timeout(),
            chunk_timeout: config.chunk_timeout(),
            pool_max_idle_per_host: config.network.parallel_downloads,
            retry: RetryConfig {
                max_retries: config.network.retries,
                initial_delay: config.retry_delay(),
                max_delay: config.max_retry_delay(),
                ..RetryConfig::default()
            },
            ..Self::default()
        }
    }
}

/// HTTP client wrapper shared by metadata and artifact transfers
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ClientBuild(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Issue a single GET without retries. Status handling is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` for timeouts, connection failures and other
    /// transport errors.
    pub async fn get_once(&self, url: &str) -> Result<Response, NetworkError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, &e))
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Get the underlying reqwest client for advanced usage
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for NetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Classify a reqwest failure
pub(crate) fn map_reqwest_error(url: &str, error: &reqwest::Error) -> NetworkError {
    if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        NetworkError::ConnectionFailed {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else if let Some(status) = error.status() {
        NetworkError::HttpError {
            status: status.as_u16(),
            url: url.to_string(),
        }
    } else if error.is_body() || error.is_request() {
        // Mid-body resets surface here; treat them like a dropped connection
        NetworkError::ConnectionFailed {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        NetworkError::DownloadFailed(format!("{url}: {error}"))
    }
}
