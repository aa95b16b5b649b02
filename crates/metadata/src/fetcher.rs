//! Metadata lookup: session memo, then the local repository, then remotes

use crate::effective::EffectivePom;
use crate::pom::{self, RawPom};
use dashmap::DashMap;
use futures::future::BoxFuture;
use pkgrepo_config::{acquire_semaphore_permit, create_semaphore};
use pkgrepo_errors::{Error, MetadataError};
use pkgrepo_events::{AppEvent, EventEmitter, EventSender, MetadataEvent};
use pkgrepo_net::{fetch_bytes, write_atomic, NetClient, TransferKind};
use pkgrepo_repository::RepositoryRegistry;
use pkgrepo_types::{Coordinate, DependencyDeclaration};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Longest `<parent>` chain followed
pub const MAX_PARENT_DEPTH: usize = 16;

const DEFAULT_PARALLEL_FETCHES: usize = 8;

/// Fetches and memoizes effective metadata documents.
///
/// One fetcher lives for one session; documents are shared between all
/// resolutions run through it.
pub struct MetadataFetcher {
    registry: Arc<RepositoryRegistry>,
    client: NetClient,
    documents: DashMap<String, Arc<EffectivePom>>,
    permits: Arc<Semaphore>,
    tx: Option<EventSender>,
}

impl EventEmitter for MetadataFetcher {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl MetadataFetcher {
    #[must_use]
    pub fn new(registry: Arc<RepositoryRegistry>, client: NetClient, tx: Option<EventSender>) -> Self {
        Self {
            registry,
            client,
            documents: DashMap::new(),
            permits: create_semaphore(DEFAULT_PARALLEL_FETCHES),
            tx,
        }
    }

    /// Share a permit pool bounding remote fetches in flight
    #[must_use]
    pub fn with_permits(mut self, permits: Arc<Semaphore>) -> Self {
        self.permits = permits;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    /// Dependencies declared by `coordinate`'s metadata, management applied.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::NotFound` if no location has the document,
    /// `MetadataError::Parse` if it or one of its parents is malformed, and
    /// I/O errors from the local repository.
    pub async fn fetch_declarations(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Vec<DependencyDeclaration>, Error> {
        Ok(self.fetch_document(coordinate).await?.dependencies().to_vec())
    }

    /// Effective metadata of `coordinate` (classifier and extension ignored).
    ///
    /// # Errors
    ///
    /// Same as [`MetadataFetcher::fetch_declarations`].
    pub async fn fetch_document(&self, coordinate: &Coordinate) -> Result<Arc<EffectivePom>, Error> {
        self.load(RepositoryRegistry::metadata_coordinate(coordinate), Vec::new())
            .await
    }

    /// Number of memoized documents, parents included
    #[must_use]
    pub fn cached_documents(&self) -> usize {
        self.documents.len()
    }

    fn load(&self, pom: Coordinate, chain: Vec<String>) -> BoxFuture<'_, Result<Arc<EffectivePom>, Error>> {
        Box::pin(async move {
            let key = gav(&pom);
            if let Some(doc) = self.documents.get(&key) {
                return Ok(Arc::clone(doc.value()));
            }

            if chain.contains(&key) {
                let mut cycle = chain;
                cycle.push(key.clone());
                return Err(parse_error(&key, format!("parent cycle: {}", cycle.join(" -> "))));
            }
            if chain.len() >= MAX_PARENT_DEPTH {
                return Err(parse_error(
                    &key,
                    format!("parent chain deeper than {MAX_PARENT_DEPTH}"),
                ));
            }

            let raw = self.read_document(&pom, &key).await?;
            let parent = match &raw.parent {
                Some(p) => {
                    let parent = Coordinate::new(&p.group_id, &p.artifact_id, &p.version)
                        .map_err(|e| parse_error(&key, format!("invalid parent: {e}")))?
                        .with_extension(pkgrepo_repository::METADATA_EXTENSION);
                    let mut chain = chain;
                    chain.push(key.clone());
                    Some(self.load(parent, chain).await?)
                }
                None => None,
            };

            let doc = Arc::new(EffectivePom::build(pom, raw, parent.as_deref())?);
            self.documents.insert(key, Arc::clone(&doc));
            Ok(doc)
        })
    }

    async fn read_document(&self, pom: &Coordinate, key: &str) -> Result<RawPom, Error> {
        let local = self.registry.resolve_local_path(pom);
        match tokio::fs::read(&local).await {
            Ok(bytes) => {
                self.emit(AppEvent::Metadata(MetadataEvent::CacheHit {
                    coordinate: key.to_string(),
                    path: local.display().to_string(),
                }));
                return parse_document(key, &bytes);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io_with_path(&e, local)),
        }

        let mut attempts = Vec::new();
        for remote in self.registry.remotes() {
            let url = RepositoryRegistry::remote_url(remote, pom)?;
            let permit = acquire_semaphore_permit(Arc::clone(&self.permits), "metadata fetch").await?;
            let fetched =
                fetch_bytes(&self.client, &url, TransferKind::Metadata, self.tx.as_ref()).await;
            drop(permit);
            match fetched {
                Ok(Some(bytes)) => {
                    // Only well-formed documents reach the cache
                    let raw = parse_document(key, &bytes)?;
                    write_atomic(&local, &bytes).await?;
                    self.emit(AppEvent::Metadata(MetadataEvent::Fetched {
                        coordinate: key.to_string(),
                        repository: remote.id().to_string(),
                        url,
                    }));
                    return Ok(raw);
                }
                Ok(None) => {
                    self.emit(AppEvent::Metadata(MetadataEvent::NotFoundIn {
                        coordinate: key.to_string(),
                        repository: remote.id().to_string(),
                    }));
                    attempts.push(format!("{}: not found", remote.id()));
                }
                Err(e) => {
                    self.emit_debug(format!("metadata fetch from {url} failed: {e}"));
                    attempts.push(format!("{}: {e}", remote.id()));
                }
            }
        }

        Err(MetadataError::NotFound {
            coordinate: key.to_string(),
            attempts,
        }
        .into())
    }
}

impl std::fmt::Debug for MetadataFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataFetcher")
            .field("registry", &self.registry)
            .field("documents", &self.documents.len())
            .finish_non_exhaustive()
    }
}

fn gav(pom: &Coordinate) -> String {
    format!("{}:{}", pom.module(), pom.version())
}

fn parse_error(coordinate: &str, message: String) -> Error {
    MetadataError::Parse {
        coordinate: coordinate.to_string(),
        message,
    }
    .into()
}

fn parse_document(key: &str, bytes: &[u8]) -> Result<RawPom, Error> {
    pom::parse(&String::from_utf8_lossy(bytes)).map_err(|message| parse_error(key, message))
}
