//! Resolve coordinates into local artifact paths

use pkgrepo_artifacts::ArtifactFetcher;
use pkgrepo_config::Config;
use pkgrepo_errors::Error;
use pkgrepo_events::{EventEmitter, EventSender, FailureContext};
use pkgrepo_metadata::MetadataFetcher;
use pkgrepo_repository::RepositoryRegistry;
use pkgrepo_resolver::{GraphBuilder, ResolvedGraph};
use pkgrepo_types::{Coordinate, ScopeFilter};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// One resolution context: configuration, repositories, caches and the
/// event channel. Build it with [`crate::SessionBuilder`].
///
/// Metadata documents read during the session are memoized, so resolving
/// several coordinates through one session fetches each document once.
pub struct ResolutionSession {
    pub(crate) config: Config,
    pub(crate) registry: Arc<RepositoryRegistry>,
    pub(crate) metadata: MetadataFetcher,
    pub(crate) artifacts: ArtifactFetcher,
    pub(crate) filter: ScopeFilter,
    pub(crate) tx: Option<EventSender>,
}

impl EventEmitter for ResolutionSession {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl ResolutionSession {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    #[must_use]
    pub fn scope_filter(&self) -> &ScopeFilter {
        &self.filter
    }

    /// Resolve the first coordinate and fetch its closure.
    ///
    /// Every input is parsed before any network activity, but only the first
    /// one is resolved; the rest are reported in a warning event. Returns the
    /// local path of every graph node in preorder, root first. An empty input
    /// returns an empty list.
    ///
    /// # Errors
    ///
    /// Returns the first parse, metadata, resolution or download failure.
    /// Artifacts fetched before a failure stay in the local repository.
    pub async fn resolve<S: AsRef<str>>(&self, coordinates: &[S]) -> Result<Vec<PathBuf>, Error> {
        let roots = parse_all(coordinates)?;
        let Some((root, ignored)) = roots.split_first() else {
            return Ok(Vec::new());
        };
        if !ignored.is_empty() {
            let names: Vec<String> = ignored.iter().map(ToString::to_string).collect();
            self.emit_warning_with_context(
                format!("only {root} is resolved; {} coordinate(s) ignored", ignored.len()),
                names.join(", "),
            );
        }

        let roots = std::slice::from_ref(root);
        self.tracked("resolve", roots, async {
            let graph = self.resolve_graph(roots).await?;
            self.fetch_graph(&graph).await
        })
        .await
    }

    /// Resolve every coordinate as a root of one mediated graph and fetch it.
    ///
    /// # Errors
    ///
    /// Same as [`ResolutionSession::resolve`].
    pub async fn resolve_all<S: AsRef<str>>(
        &self,
        coordinates: &[S],
    ) -> Result<Vec<PathBuf>, Error> {
        let roots = parse_all(coordinates)?;
        if roots.is_empty() {
            return Ok(Vec::new());
        }
        self.tracked("resolve_all", &roots, async {
            let graph = self.resolve_graph(&roots).await?;
            self.fetch_graph(&graph).await
        })
        .await
    }

    /// Build the graph for `roots` without downloading artifacts.
    ///
    /// # Errors
    ///
    /// Returns metadata and resolution failures.
    pub async fn resolve_graph(&self, roots: &[Coordinate]) -> Result<ResolvedGraph, Error> {
        GraphBuilder::new(&self.metadata)
            .with_parallelism(self.config.resolver.parallel_metadata)
            .with_events(self.tx.clone())
            .resolve_roots(roots, &self.filter)
            .await
    }

    /// Fetch every node of `graph`, paths in preorder
    ///
    /// # Errors
    ///
    /// Returns the first download failure.
    pub async fn fetch_graph(&self, graph: &ResolvedGraph) -> Result<Vec<PathBuf>, Error> {
        let coordinates: Vec<Coordinate> = graph
            .nodes_preorder()
            .into_iter()
            .map(|node| node.coordinate.clone())
            .collect();
        self.artifacts.fetch_all(&coordinates).await
    }

    async fn tracked<F>(
        &self,
        operation: &str,
        roots: &[Coordinate],
        work: F,
    ) -> Result<Vec<PathBuf>, Error>
    where
        F: Future<Output = Result<Vec<PathBuf>, Error>>,
    {
        self.emit_operation_started(operation, roots.iter().map(ToString::to_string).collect());
        let start = Instant::now();
        match work.await {
            Ok(paths) => {
                let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                self.emit_operation_completed(operation, paths.len(), elapsed);
                Ok(paths)
            }
            Err(e) => {
                self.emit_operation_failed(operation, FailureContext::from_error(&e));
                Err(e)
            }
        }
    }

    /// Where `coordinate` lives in the local repository; no I/O
    #[must_use]
    pub fn local_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.registry.resolve_local_path(coordinate)
    }
}

impl std::fmt::Debug for ResolutionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionSession")
            .field("registry", &self.registry)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

fn parse_all<S: AsRef<str>>(coordinates: &[S]) -> Result<Vec<Coordinate>, Error> {
    coordinates
        .iter()
        .map(|c| Coordinate::parse(c.as_ref()).map_err(Error::from))
        .collect()
}
