use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Resolver domain events for dependency graph construction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResolverEvent {
    /// Graph construction started
    Started { roots: Vec<String>, scopes: String },

    /// A new node was added to the graph
    NodeResolved {
        coordinate: String,
        depth: usize,
        parent: Option<String>,
    },

    /// A different version of an already-pinned module was requested
    ConflictMediated {
        module: String,
        winner: String,
        loser: String,
        requested_by: String,
    },

    /// Graph construction completed
    Completed {
        root: String,
        nodes: usize,
        mediations: usize,
        duration_ms: u64,
    },

    /// Graph construction failed
    Failed { root: String, failure: FailureContext },
}
