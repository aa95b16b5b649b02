#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the pkgrepo resolver
//!
//! This crate provides the coordinate model shared by every other crate:
//! artifact coordinates, dependency scopes, exclusions and the dependency
//! declarations read out of metadata documents.

pub mod coordinate;
pub mod declaration;
pub mod scope;

pub use coordinate::{
    segment_problem, ArtifactKey, Coordinate, ModuleId, VersionKey, DEFAULT_EXTENSION,
};
pub use declaration::{DependencyDeclaration, Exclusion};
pub use scope::{Scope, ScopeFilter};

use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text, one item per line
    #[default]
    Text,
    /// JSON output
    Json,
}
