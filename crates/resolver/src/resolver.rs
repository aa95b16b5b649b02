//! Breadth-first graph construction with nearest-wins mediation

use crate::graph::{Mediation, NodeId, ResolvedGraph};
use crate::source::DeclarationSource;
use futures::stream::{self, StreamExt};
use pkgrepo_errors::{Error, ResolutionError};
use pkgrepo_events::{AppEvent, EventEmitter, EventSender, FailureContext, ResolverEvent};
use pkgrepo_metadata::ManagedDependency;
use pkgrepo_types::{ArtifactKey, Coordinate, DependencyDeclaration, Scope, ScopeFilter};
use std::collections::HashMap;
use std::time::Instant;

/// Default number of metadata fetches in flight per level
pub const DEFAULT_PARALLEL_METADATA: usize = 8;

/// Builds the transitive closure of one or more roots
pub struct GraphBuilder<'a> {
    source: &'a dyn DeclarationSource,
    parallel: usize,
    tx: Option<EventSender>,
}

impl EventEmitter for GraphBuilder<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

type Management = HashMap<ArtifactKey, ManagedDependency>;

impl<'a> GraphBuilder<'a> {
    #[must_use]
    pub fn new(source: &'a dyn DeclarationSource) -> Self {
        Self {
            source,
            parallel: DEFAULT_PARALLEL_METADATA,
            tx: None,
        }
    }

    /// Bound concurrent metadata fetches; at least one
    #[must_use]
    pub fn with_parallelism(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    #[must_use]
    pub fn with_events(mut self, tx: Option<EventSender>) -> Self {
        self.tx = tx;
        self
    }

    /// Resolve the closure of a single root.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::CyclicDependency` when declarations loop
    /// back onto the path being explored, and any metadata error raised
    /// while fetching declarations.
    pub async fn resolve(&self, root: &Coordinate, filter: &ScopeFilter) -> Result<ResolvedGraph, Error> {
        self.resolve_roots(std::slice::from_ref(root), filter)
            .await
    }

    /// Resolve several roots into one graph, mediated together.
    ///
    /// Roots sit at depth 0 in input order. A root whose module is already
    /// pinned at another version by an earlier root is recorded as a
    /// mediation and skipped.
    ///
    /// # Errors
    ///
    /// Same as [`GraphBuilder::resolve`].
    pub async fn resolve_roots(
        &self,
        roots: &[Coordinate],
        filter: &ScopeFilter,
    ) -> Result<ResolvedGraph, Error> {
        let label = roots
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.emit(AppEvent::Resolver(ResolverEvent::Started {
            roots: roots.iter().map(ToString::to_string).collect(),
            scopes: filter.to_string(),
        }));
        let started = Instant::now();

        match self.build(roots, filter).await {
            Ok(graph) => {
                self.emit(AppEvent::Resolver(ResolverEvent::Completed {
                    root: label,
                    nodes: graph.len(),
                    mediations: graph.mediations().len(),
                    duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                }));
                Ok(graph)
            }
            Err(e) => {
                self.emit(AppEvent::Resolver(ResolverEvent::Failed {
                    root: label,
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    async fn build(&self, roots: &[Coordinate], filter: &ScopeFilter) -> Result<ResolvedGraph, Error> {
        let mut graph = ResolvedGraph::default();
        let mut management: Vec<Management> = Vec::new();
        let mut level = Vec::new();

        for root in roots {
            let key = root.artifact_key();
            if let Some(pinned) = graph.pinned(&key.module()) {
                let winner = graph.node(pinned).version().to_string();
                if winner != root.version() {
                    self.mediate(&mut graph, key, winner, root.version().to_string(), None);
                    continue;
                }
                if graph.existing(&key).is_some() {
                    continue;
                }
            }
            let origin = management.len();
            management.push(self.source.management(root).await?);
            let id = graph.add_node(root.clone(), 0, Vec::new(), origin);
            self.node_resolved(&graph, id, None);
            level.push(id);
        }

        while !level.is_empty() {
            let coordinates: Vec<Coordinate> = level
                .iter()
                .map(|id| graph.node(*id).coordinate.clone())
                .collect();
            let fetched: Vec<Result<Vec<DependencyDeclaration>, Error>> =
                stream::iter(coordinates.iter().map(|c| self.source.declarations(c)))
                    .buffered(self.parallel)
                    .collect()
                    .await;

            let mut next = Vec::new();
            for (parent, declarations) in level.iter().zip(fetched) {
                for declaration in declarations? {
                    self.visit(&mut graph, *parent, declaration, filter, &management, &mut next)?;
                }
            }
            level = next;
        }

        Ok(graph)
    }

    fn visit(
        &self,
        graph: &mut ResolvedGraph,
        parent: NodeId,
        declaration: DependencyDeclaration,
        filter: &ScopeFilter,
        management: &[Management],
        next: &mut Vec<NodeId>,
    ) -> Result<(), Error> {
        let (parent_scope, parent_depth, from_root, origin) = {
            let node = graph.node(parent);
            (node.coordinate.scope(), node.depth, node.is_root(), node.origin)
        };

        let declaration = if from_root {
            declaration
        } else {
            apply_management(declaration, management.get(origin))
        };

        let scope = if from_root {
            Some(declaration.scope)
        } else {
            Scope::propagate(parent_scope, declaration.scope)
        };
        let Some(scope) = scope.filter(|s| filter.accepts(*s)) else {
            return Ok(());
        };
        if declaration.optional && !from_root {
            return Ok(());
        }
        if declaration.is_excluded_by(graph.node(parent).exclusions.iter()) {
            return Ok(());
        }

        let coordinate = declaration.coordinate.with_scope(scope);
        let key = coordinate.artifact_key();

        if let Some(pinned) = graph.pinned(&key.module()) {
            let winner = graph.node(pinned).version().to_string();
            if winner == coordinate.version() {
                if let Some(existing) = graph.existing(&key) {
                    check_cycle(graph, existing, parent)?;
                    graph.attach(parent, existing);
                    return Ok(());
                }
            } else {
                check_cycle(graph, pinned, parent)?;
                let requested_by = graph.node(parent).coordinate.clone();
                self.mediate(
                    graph,
                    key,
                    winner,
                    coordinate.version().to_string(),
                    Some(requested_by),
                );
                return Ok(());
            }
        }

        let mut exclusions = graph.node(parent).exclusions.clone();
        exclusions.extend(declaration.exclusions);
        let id = graph.add_node(coordinate, parent_depth + 1, exclusions, origin);
        graph.attach(parent, id);
        self.node_resolved(graph, id, Some(parent));
        next.push(id);
        Ok(())
    }

    fn mediate(
        &self,
        graph: &mut ResolvedGraph,
        artifact: ArtifactKey,
        winner: String,
        loser: String,
        requested_by: Option<Coordinate>,
    ) {
        self.emit(AppEvent::Resolver(ResolverEvent::ConflictMediated {
            module: artifact.module().to_string(),
            winner: winner.clone(),
            loser: loser.clone(),
            requested_by: requested_by
                .as_ref()
                .map_or_else(|| "(root)".to_string(), ToString::to_string),
        }));
        graph.record_mediation(Mediation {
            artifact,
            winner,
            loser,
            requested_by,
        });
    }

    fn node_resolved(&self, graph: &ResolvedGraph, id: NodeId, parent: Option<NodeId>) {
        let node = graph.node(id);
        self.emit(AppEvent::Resolver(ResolverEvent::NodeResolved {
            coordinate: node.coordinate.to_string(),
            depth: node.depth,
            parent: parent.map(|p| graph.node(p).coordinate.to_string()),
        }));
    }
}

/// Root management overrides the version, and the scope when the document left it implicit
fn apply_management(
    mut declaration: DependencyDeclaration,
    management: Option<&Management>,
) -> DependencyDeclaration {
    let Some(managed) = management.and_then(|m| m.get(&declaration.coordinate.artifact_key())) else {
        return declaration;
    };
    if let Some(version) = &managed.version {
        declaration = declaration.with_version(version);
    }
    if let (false, Some(scope)) = (declaration.scope_explicit, managed.scope) {
        declaration = declaration.with_scope(scope);
    }
    declaration
}

/// Fails when `current` is reachable from `existing`, i.e. linking them
/// would close a loop.
fn check_cycle(graph: &ResolvedGraph, existing: NodeId, current: NodeId) -> Result<(), Error> {
    let Some(path) = graph.path_between(existing, current) else {
        return Ok(());
    };
    let mut cycle: Vec<String> = path
        .iter()
        .map(|id| graph.node(*id).coordinate.to_string())
        .collect();
    cycle.push(graph.node(existing).coordinate.to_string());
    Err(ResolutionError::CyclicDependency { cycle }.into())
}
