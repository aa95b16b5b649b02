//! Explicit construction of a resolution session

use crate::session::ResolutionSession;
use pkgrepo_artifacts::ArtifactFetcher;
use pkgrepo_config::{ConcurrencyLimits, Config};
use pkgrepo_errors::Error;
use pkgrepo_events::EventSender;
use pkgrepo_metadata::MetadataFetcher;
use pkgrepo_net::{NetClient, NetConfig};
use pkgrepo_repository::RepositoryRegistry;
use pkgrepo_types::ScopeFilter;
use std::sync::Arc;

/// Builder for [`ResolutionSession`]
#[derive(Debug)]
pub struct SessionBuilder {
    config: Config,
    tx: Option<EventSender>,
    net: Option<NetClient>,
}

impl SessionBuilder {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tx: None,
            net: None,
        }
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Reuse an existing network client instead of building one from the
    /// network section of the configuration
    #[must_use]
    pub fn with_net_client(mut self, net: NetClient) -> Self {
        self.net = Some(net);
        self
    }

    /// Build the session
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid settings or repository
    /// URLs, and a network error if the HTTP client cannot be created.
    pub fn build(self) -> Result<ResolutionSession, Error> {
        let Self { config, tx, net } = self;
        config.validate()?;

        let registry = Arc::new(RepositoryRegistry::from_config(&config)?);
        let client = match net {
            Some(client) => client,
            None => NetClient::new(NetConfig::from_config(&config))?,
        };
        let limits = ConcurrencyLimits::from_config(&config);
        let filter = ScopeFilter::classpath(config.scopes()?);

        let metadata = MetadataFetcher::new(Arc::clone(&registry), client.clone(), tx.clone())
            .with_permits(Arc::clone(&limits.metadata));
        let artifacts =
            ArtifactFetcher::new(Arc::clone(&registry), client, tx.clone()).with_limits(limits);

        Ok(ResolutionSession {
            config,
            registry,
            metadata,
            artifacts,
            filter,
            tx,
        })
    }
}
