//! Artifact coordinates
//!
//! A coordinate names one file in a repository:
//! `group:name:version[:classifier]:extension`, scoped for resolution
//! purposes. Coordinates are immutable; the `with_*` methods return copies.

use crate::Scope;
use pkgrepo_errors::CoordinateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Extension used when a coordinate does not name one
pub const DEFAULT_EXTENSION: &str = "jar";

/// Identity of a module regardless of version or packaging
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId {
    pub group: String,
    pub name: String,
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)
    }
}

/// Identity of an artifact within a graph: one version per key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub group: String,
    pub name: String,
    pub classifier: Option<String>,
    pub extension: String,
}

impl ArtifactKey {
    #[must_use]
    pub fn module(&self) -> ModuleId {
        ModuleId {
            group: self.group.clone(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.extension)
    }
}

/// Artifact key plus version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionKey {
    pub artifact: ArtifactKey,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    group: String,
    name: String,
    version: String,
    classifier: Option<String>,
    extension: String,
    #[serde(default)]
    scope: Scope,
}

/// Why `value` cannot be one component of a repository path, if it can't
#[must_use]
pub fn segment_problem(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        Some("is empty")
    } else if value.contains(':') {
        Some("contains ':'")
    } else if value.contains(['/', '\\']) {
        Some("contains a path separator")
    } else if value == "." || value == ".." {
        Some("is a relative path component")
    } else if value.chars().any(char::is_control) {
        Some("contains a control character")
    } else {
        None
    }
}

impl Coordinate {
    /// Create a coordinate with the default extension and compile scope.
    ///
    /// # Errors
    ///
    /// Returns `CoordinateError::Malformed` if any part fails
    /// [`Coordinate::validate`].
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, CoordinateError> {
        let coordinate = Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
            classifier: None,
            extension: DEFAULT_EXTENSION.to_string(),
            scope: Scope::default(),
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Parse `group:name:version[:classifier][:extension]`.
    ///
    /// Fields are positional. Four fields mean `group:name:version:extension`,
    /// the same reading Aether gives its four-field `g:a:ext:v` form: the
    /// extension comes before the optional classifier. A classifier requires
    /// all five fields.
    ///
    /// # Errors
    ///
    /// Returns `CoordinateError::Malformed` when there are fewer than three or
    /// more than five fields, or when a field is empty or not usable as a
    /// path component.
    pub fn parse(text: &str) -> Result<Self, CoordinateError> {
        let malformed = |reason: &str| CoordinateError::Malformed {
            input: text.to_string(),
            reason: reason.to_string(),
        };

        let fields: Vec<&str> = text.trim().split(':').collect();
        if fields.len() < 3 {
            return Err(malformed("expected at least group:name:version"));
        }
        if fields.len() > 5 {
            return Err(malformed("too many fields"));
        }
        if let Some(pos) = fields.iter().position(|f| f.trim().is_empty()) {
            return Err(malformed(&format!("field {} is empty", pos + 1)));
        }

        let field = |i: usize| fields[i].trim().to_string();
        let (classifier, extension) = match fields.len() {
            3 => (None, DEFAULT_EXTENSION.to_string()),
            4 => (None, field(3)),
            _ => (Some(field(3)), field(4)),
        };

        let coordinate = Self {
            group: field(0),
            name: field(1),
            version: field(2),
            classifier,
            extension,
            scope: Scope::default(),
        };
        coordinate.validate().map_err(|e| match e {
            CoordinateError::Malformed { reason, .. } => malformed(&reason),
            other => other,
        })?;
        Ok(coordinate)
    }

    /// Check every field against the local repository layout.
    ///
    /// Fields map onto path components, so separators and `.`/`..` are
    /// rejected. Group segments between dots must be non-empty.
    ///
    /// # Errors
    ///
    /// Returns `CoordinateError::Malformed` naming the first bad field.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        let parts = [
            ("group", Some(self.group.as_str())),
            ("name", Some(self.name.as_str())),
            ("version", Some(self.version.as_str())),
            ("classifier", self.classifier.as_deref()),
            ("extension", Some(self.extension.as_str())),
        ];
        for (label, value) in parts {
            let Some(value) = value else { continue };
            let problem = if label == "group" && value.split('.').any(str::is_empty) {
                Some("has an empty segment")
            } else {
                segment_problem(value)
            };
            if let Some(problem) = problem {
                return Err(CoordinateError::Malformed {
                    input: self.to_string(),
                    reason: format!("{label} '{value}' {problem}"),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    #[must_use]
    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    /// Replace the classifier. An empty string clears it.
    #[must_use]
    pub fn with_classifier(&self, classifier: Option<&str>) -> Self {
        Self {
            classifier: classifier.filter(|c| !c.is_empty()).map(str::to_string),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_extension(&self, extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn module(&self) -> ModuleId {
        ModuleId {
            group: self.group.clone(),
            name: self.name.clone(),
        }
    }

    #[must_use]
    pub fn artifact_key(&self) -> ArtifactKey {
        ArtifactKey {
            group: self.group.clone(),
            name: self.name.clone(),
            classifier: self.classifier.clone(),
            extension: self.extension.clone(),
        }
    }

    #[must_use]
    pub fn version_key(&self) -> VersionKey {
        VersionKey {
            artifact: self.artifact_key(),
            version: self.version.clone(),
        }
    }

    /// Group with dots replaced by path separators, as used in repository layout
    #[must_use]
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }

    /// `{name}-{version}[-{classifier}].{extension}`
    #[must_use]
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.name, self.version, classifier, self.extension
            ),
            None => format!("{}-{}.{}", self.name, self.version, self.extension),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.extension)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_fields() {
        let c = Coordinate::parse("org.apache.logging.log4j:log4j-core:2.20.0").unwrap();
        assert_eq!(c.group(), "org.apache.logging.log4j");
        assert_eq!(c.name(), "log4j-core");
        assert_eq!(c.version(), "2.20.0");
        assert_eq!(c.classifier(), None);
        assert_eq!(c.extension(), "jar");
        assert_eq!(c.scope(), Scope::Compile);
        assert_eq!(c.to_string(), "org.apache.logging.log4j:log4j-core:2.20.0:jar");
    }

    #[test]
    fn test_parse_four_fields_is_extension() {
        let c = Coordinate::parse("g:n:1.0:pom").unwrap();
        assert_eq!(c.extension(), "pom");
        assert_eq!(c.classifier(), None);
    }

    #[test]
    fn test_parse_five_fields() {
        let c = Coordinate::parse("g:n:1.0:sources:jar").unwrap();
        assert_eq!(c.classifier(), Some("sources"));
        assert_eq!(c.file_name(), "n-1.0-sources.jar");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "g:n", "g::1.0", "g:n:1.0:a:b:c", ":n:1.0", "g:n:1.0:"] {
            let err = Coordinate::parse(bad).unwrap_err();
            assert!(
                matches!(err, CoordinateError::Malformed { .. }),
                "expected malformed for {bad:?}"
            );
        }
    }

    #[test]
    fn test_keys_ignore_scope() {
        let a = Coordinate::parse("g:n:1.0").unwrap();
        let b = a.with_scope(Scope::Test).with_version("2.0");
        assert_eq!(a.artifact_key(), b.artifact_key());
        assert_ne!(a.version_key(), b.version_key());
        assert_eq!(a.module().to_string(), "g:n");
    }

    #[test]
    fn test_group_path() {
        let c = Coordinate::new("com.example.lib", "core", "1").unwrap();
        assert_eq!(c.group_path(), "com/example/lib");
        assert_eq!(c.file_name(), "core-1.jar");
    }

    #[test]
    fn test_new_validates() {
        assert!(Coordinate::new("g", "", "1").is_err());
        assert!(Coordinate::new("g:x", "n", "1").is_err());
        assert!(Coordinate::new("g", "n", "..").is_err());
    }

    #[test]
    fn test_fields_must_be_path_components() {
        for bad in [
            "g:a:../../../../../tmp/escaped",
            "g:a:1:../../x",
            "g:a:1:..:jar",
            "g:..:1",
            "g:a/b:1",
            "g:a:1\\..",
            "..:a:1",
            ".g:a:1",
            "g..h:a:1",
            "g.:a:1",
        ] {
            let err = Coordinate::parse(bad).unwrap_err();
            let CoordinateError::Malformed { input, .. } = err else {
                panic!("expected malformed for {bad:?}");
            };
            assert_eq!(input, bad);
        }
        assert!(Coordinate::parse("org.example:lib:1.0-rc.1:tar.gz").is_ok());
    }

    #[test]
    fn test_segment_problem() {
        assert_eq!(segment_problem("1.0"), None);
        assert_eq!(segment_problem(".."), Some("is a relative path component"));
        assert_eq!(segment_problem("a/b"), Some("contains a path separator"));
    }
}
