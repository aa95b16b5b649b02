//! Resolved dependency graph types and operations

use pkgrepo_types::{ArtifactKey, Coordinate, Exclusion, ModuleId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Write as _;

/// Index of a node in its graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One resolved artifact
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: NodeId,
    /// Resolved coordinate; its scope is the effective scope
    pub coordinate: Coordinate,
    /// Distance from the nearest root; roots are at depth 0
    pub depth: usize,
    pub parents: Vec<NodeId>,
    /// In declaration order
    pub children: Vec<NodeId>,
    /// Exclusions accumulated from the root down to this node
    pub(crate) exclusions: Vec<Exclusion>,
    /// Index of the root this node was first reached from
    pub(crate) origin: usize,
}

impl GraphNode {
    #[must_use]
    pub fn version(&self) -> &str {
        self.coordinate.version()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// A version request that lost against an already pinned version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mediation {
    pub artifact: ArtifactKey,
    pub winner: String,
    pub loser: String,
    /// The node whose declaration asked for the losing version; `None` for a
    /// root that lost
    pub requested_by: Option<Coordinate>,
}

/// Resolution result: a DAG of artifacts, one version per module
#[derive(Debug, Clone, Default)]
pub struct ResolvedGraph {
    nodes: Vec<GraphNode>,
    roots: Vec<NodeId>,
    by_artifact: HashMap<ArtifactKey, NodeId>,
    pins: HashMap<ModuleId, NodeId>,
    mediations: Vec<Mediation>,
}

impl ResolvedGraph {
    /// The first root, if any
    #[must_use]
    pub fn root(&self) -> Option<&GraphNode> {
        self.roots.first().map(|id| self.node(*id))
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Node by id. Ids are only valid for the graph that issued them.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.0]
    }

    /// Every node once: roots in order, depth-first, children in
    /// declaration order
    #[must_use]
    pub fn nodes_preorder(&self) -> Vec<&GraphNode> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            let mut stack = vec![*root];
            while let Some(id) = stack.pop() {
                if !seen.insert(id) {
                    continue;
                }
                let node = self.node(id);
                out.push(node);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    #[must_use]
    pub fn mediations(&self) -> &[Mediation] {
        &self.mediations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if any version of `group:name` is part of the graph
    #[must_use]
    pub fn contains(&self, group: &str, name: &str) -> bool {
        self.pins.contains_key(&ModuleId {
            group: group.to_string(),
            name: name.to_string(),
        })
    }

    #[must_use]
    pub fn find(&self, key: &ArtifactKey) -> Option<&GraphNode> {
        self.by_artifact.get(key).map(|id| self.node(*id))
    }

    /// Indented tree, one line per edge. A node already printed is marked
    /// `(*)` and not expanded again.
    #[must_use]
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        let mut printed = HashSet::new();
        for root in &self.roots {
            let node = self.node(*root);
            let _ = writeln!(out, "{}", node.coordinate);
            printed.insert(*root);
            self.render_children(*root, "", &mut printed, &mut out);
        }
        out
    }

    fn render_children(
        &self,
        id: NodeId,
        prefix: &str,
        printed: &mut HashSet<NodeId>,
        out: &mut String,
    ) {
        let children = &self.node(id).children;
        for (i, child) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            let node = self.node(*child);
            let branch = if last { "\\- " } else { "+- " };
            let repeated = !printed.insert(*child);
            let _ = writeln!(
                out,
                "{prefix}{branch}{} ({}){}",
                node.coordinate,
                node.coordinate.scope(),
                if repeated { " (*)" } else { "" }
            );
            if !repeated {
                let nested = format!("{prefix}{}", if last { "   " } else { "|  " });
                self.render_children(*child, &nested, printed, out);
            }
        }
    }

    pub(crate) fn pinned(&self, module: &ModuleId) -> Option<NodeId> {
        self.pins.get(module).copied()
    }

    pub(crate) fn existing(&self, key: &ArtifactKey) -> Option<NodeId> {
        self.by_artifact.get(key).copied()
    }

    /// Add a node; the first node of a module pins its version.
    pub(crate) fn add_node(
        &mut self,
        coordinate: Coordinate,
        depth: usize,
        exclusions: Vec<Exclusion>,
        origin: usize,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let key = coordinate.artifact_key();
        self.pins.entry(key.module()).or_insert(id);
        self.by_artifact.insert(key, id);
        self.nodes.push(GraphNode {
            id,
            coordinate,
            depth,
            parents: Vec::new(),
            children: Vec::new(),
            exclusions,
            origin,
        });
        if depth == 0 {
            self.roots.push(id);
        }
        id
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes[parent.0].children.contains(&child) {
            self.nodes[parent.0].children.push(child);
            self.nodes[child.0].parents.push(parent);
        }
    }

    pub(crate) fn record_mediation(&mut self, mediation: Mediation) {
        self.mediations.push(mediation);
    }

    /// Child-edge path from `from` to `to`, both included, if one exists.
    pub(crate) fn path_between(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        if from == to {
            return Some(vec![from]);
        }
        let mut previous: HashMap<NodeId, NodeId> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        while let Some(id) = queue.pop_front() {
            for child in &self.node(id).children {
                if *child == from || previous.contains_key(child) {
                    continue;
                }
                previous.insert(*child, id);
                if *child == to {
                    let mut path = vec![to];
                    let mut cursor = to;
                    while let Some(prev) = previous.get(&cursor) {
                        path.push(*prev);
                        cursor = *prev;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(*child);
            }
        }
        None
    }
}
