#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Dependency graph construction for pkgrepo
//!
//! Computes the transitive closure of one or more root coordinates
//! breadth-first. Scopes are propagated and filtered, optional and excluded
//! declarations are pruned, and version conflicts are mediated nearest-wins:
//! the first version of a module reached in BFS order is the only one kept.
//! Nodes live in an arena, so the result is a DAG addressed by `NodeId`.

mod graph;
mod resolver;
mod source;

pub use graph::{GraphNode, Mediation, NodeId, ResolvedGraph};
pub use resolver::{GraphBuilder, DEFAULT_PARALLEL_METADATA};
pub use source::DeclarationSource;
