//! Dependency declarations and exclusions

use crate::{Coordinate, ModuleId, Scope};
use pkgrepo_errors::CoordinateError;
use serde::{Deserialize, Serialize};
use std::fmt;

const WILDCARD: &str = "*";

/// `(group, name)` pattern removing a dependency from a subtree. Either half
/// may be `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exclusion {
    pub group: String,
    pub name: String,
}

impl Exclusion {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }

    /// Parse `group:name`. A bare `group` excludes every name in it.
    ///
    /// # Errors
    ///
    /// Returns `CoordinateError::MalformedExclusion` for empty parts or more
    /// than two fields.
    pub fn parse(text: &str) -> Result<Self, CoordinateError> {
        let malformed = || CoordinateError::MalformedExclusion {
            input: text.to_string(),
        };
        let mut parts = text.trim().split(':');
        let group = parts.next().map(str::trim).filter(|g| !g.is_empty());
        let name = parts.next().map(str::trim);
        if parts.next().is_some() {
            return Err(malformed());
        }
        match (group, name) {
            (Some(group), Some(name)) if !name.is_empty() => Ok(Self::new(group, name)),
            (Some(group), None) => Ok(Self::new(group, WILDCARD)),
            _ => Err(malformed()),
        }
    }

    #[must_use]
    pub fn matches(&self, coordinate: &Coordinate) -> bool {
        self.matches_module(coordinate.group(), coordinate.name())
    }

    #[must_use]
    pub fn matches_module(&self, group: &str, name: &str) -> bool {
        (self.group == WILDCARD || self.group == group) && (self.name == WILDCARD || self.name == name)
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)
    }
}

/// One `<dependency>` entry of a metadata document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    /// Target coordinate; its scope mirrors `scope`
    pub coordinate: Coordinate,
    pub scope: Scope,
    /// False when the document omitted `<scope>`, so managed scopes may apply
    pub scope_explicit: bool,
    pub optional: bool,
    pub exclusions: Vec<Exclusion>,
}

impl DependencyDeclaration {
    #[must_use]
    pub fn new(coordinate: Coordinate, scope: Scope) -> Self {
        Self {
            coordinate: coordinate.with_scope(scope),
            scope,
            scope_explicit: true,
            optional: false,
            exclusions: Vec::new(),
        }
    }

    #[must_use]
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    #[must_use]
    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self.coordinate = self.coordinate.with_scope(scope);
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: &str) -> Self {
        self.coordinate = self.coordinate.with_version(version);
        self
    }

    #[must_use]
    pub fn module(&self) -> ModuleId {
        self.coordinate.module()
    }

    /// True when any exclusion in `exclusions` removes this declaration.
    #[must_use]
    pub fn is_excluded_by<'a>(&self, mut exclusions: impl Iterator<Item = &'a Exclusion>) -> bool {
        exclusions.any(|e| e.matches(&self.coordinate))
    }
}
