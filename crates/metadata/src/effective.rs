//! Effective metadata: a document merged with its parents and interpolated

use crate::interpolate::interpolate;
use crate::pom::{RawDependency, RawPom};
use pkgrepo_errors::MetadataError;
use pkgrepo_types::{
    segment_problem, ArtifactKey, Coordinate, DependencyDeclaration, Exclusion, Scope,
};
use std::collections::HashMap;

/// A `dependencyManagement` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedDependency {
    pub version: Option<String>,
    pub scope: Option<Scope>,
    pub exclusions: Vec<Exclusion>,
}

/// Effective model of one metadata document
#[derive(Debug, Clone)]
pub struct EffectivePom {
    coordinate: Coordinate,
    parent: Option<Coordinate>,
    packaging: String,
    properties: HashMap<String, String>,
    dependency_management: HashMap<ArtifactKey, ManagedDependency>,
    dependencies: Vec<DependencyDeclaration>,
    // Merged, uninterpolated entries; children re-interpolate them in their own context
    raw_management: Vec<RawDependency>,
    raw_dependencies: Vec<RawDependency>,
}

impl EffectivePom {
    /// Merge `raw` over `parent` and resolve it for `coordinate`.
    pub(crate) fn build(
        coordinate: Coordinate,
        raw: RawPom,
        parent: Option<&EffectivePom>,
    ) -> Result<Self, MetadataError> {
        let err = |message: String| MetadataError::Parse {
            coordinate: gav(&coordinate),
            message,
        };

        let mut properties = parent.map(|p| p.properties.clone()).unwrap_or_default();
        properties.extend(raw.properties);
        for (key, value) in [
            ("project.groupId", coordinate.group()),
            ("project.artifactId", coordinate.name()),
            ("project.version", coordinate.version()),
        ] {
            properties.insert(key.to_string(), value.to_string());
        }
        if let Some(p) = &raw.parent {
            properties.insert("project.parent.groupId".into(), p.group_id.clone());
            properties.insert("project.parent.artifactId".into(), p.artifact_id.clone());
            properties.insert("project.parent.version".into(), p.version.clone());
        }

        let packaging = match &raw.packaging {
            Some(p) => interpolate(p, &properties).map_err(err)?,
            None => "jar".to_string(),
        };
        properties.insert("project.packaging".into(), packaging.clone());

        let parent_coordinate = match &raw.parent {
            Some(p) => Some(
                Coordinate::new(&p.group_id, &p.artifact_id, &p.version)
                    .map_err(|e| err(e.to_string()))?
                    .with_extension("pom"),
            ),
            None => None,
        };

        let raw_management = merge(
            parent.map(|p| p.raw_management.as_slice()),
            raw.dependency_management,
        );
        let raw_dependencies = merge(
            parent.map(|p| p.raw_dependencies.as_slice()),
            raw.dependencies,
        );

        let mut dependency_management = HashMap::new();
        for entry in &raw_management {
            if let Some((key, managed)) = resolve_managed(entry, &properties).map_err(err)? {
                dependency_management.insert(key, managed);
            }
        }

        let mut dependencies = Vec::with_capacity(raw_dependencies.len());
        for entry in &raw_dependencies {
            if let Some(declaration) =
                resolve_dependency(entry, &properties, &dependency_management).map_err(err)?
            {
                dependencies.push(declaration);
            }
        }

        Ok(Self {
            coordinate,
            parent: parent_coordinate,
            packaging,
            properties,
            dependency_management,
            dependencies,
            raw_management,
            raw_dependencies,
        })
    }

    /// Coordinate of the document itself (extension `pom`)
    #[must_use]
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Coordinate> {
        self.parent.as_ref()
    }

    #[must_use]
    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Declared dependencies with management applied, in document order
    #[must_use]
    pub fn dependencies(&self) -> &[DependencyDeclaration] {
        &self.dependencies
    }

    #[must_use]
    pub fn managed(&self, key: &ArtifactKey) -> Option<&ManagedDependency> {
        self.dependency_management.get(key)
    }

    pub fn dependency_management(&self) -> impl Iterator<Item = (&ArtifactKey, &ManagedDependency)> {
        self.dependency_management.iter()
    }
}

fn gav(coordinate: &Coordinate) -> String {
    format!("{}:{}", coordinate.module(), coordinate.version())
}

/// Parent entries first; a child entry with the same key replaces the parent's in place
fn merge(parent: Option<&[RawDependency]>, own: Vec<RawDependency>) -> Vec<RawDependency> {
    let mut merged: Vec<RawDependency> = parent.map(<[_]>::to_vec).unwrap_or_default();
    for entry in own {
        match merged.iter().position(|m| m.merge_key() == entry.merge_key()) {
            Some(pos) => merged[pos] = entry,
            None => merged.push(entry),
        }
    }
    merged
}

fn resolve_optional(
    value: Option<&str>,
    properties: &HashMap<String, String>,
) -> Result<Option<String>, String> {
    value.map(|v| interpolate(v, properties)).transpose()
}

fn required(
    value: Option<&str>,
    what: &str,
    properties: &HashMap<String, String>,
) -> Result<String, String> {
    resolve_optional(value, properties)?.ok_or_else(|| format!("dependency without <{what}>"))
}

fn check_version(group: &str, name: &str, version: &str) -> Result<(), String> {
    if version.starts_with('[') || version.starts_with('(') {
        return Err(format!(
            "version range {version} for {group}:{name} is not supported"
        ));
    }
    if let Some(problem) = segment_problem(version) {
        return Err(format!("version '{version}' of {group}:{name} {problem}"));
    }
    Ok(())
}

/// Map `<type>` and `<classifier>` to the artifact's classifier and extension
fn packaging_of(dep_type: Option<&str>, classifier: Option<String>) -> (Option<String>, String) {
    let implied = |c: &str| classifier.clone().or_else(|| Some(c.to_string()));
    match dep_type {
        None | Some("jar" | "bundle" | "maven-plugin" | "ejb") => (classifier, "jar".to_string()),
        Some("test-jar") => (implied("tests"), "jar".to_string()),
        Some("ejb-client") => (implied("client"), "jar".to_string()),
        Some("java-source") => (implied("sources"), "jar".to_string()),
        Some("javadoc") => (implied("javadoc"), "jar".to_string()),
        Some(other) => (classifier, other.to_string()),
    }
}

fn parse_scope(scope: &str) -> Result<Scope, String> {
    scope.parse::<Scope>().map_err(|e| e.to_string())
}

fn exclusions_of(
    entry: &RawDependency,
    properties: &HashMap<String, String>,
) -> Result<Vec<Exclusion>, String> {
    entry
        .exclusions
        .iter()
        .map(|(group, name)| {
            Ok(Exclusion::new(
                interpolate(group, properties)?,
                interpolate(name, properties)?,
            ))
        })
        .collect()
}

fn resolve_managed(
    entry: &RawDependency,
    properties: &HashMap<String, String>,
) -> Result<Option<(ArtifactKey, ManagedDependency)>, String> {
    let scope = resolve_optional(entry.scope.as_deref(), properties)?;
    // BOM imports are not followed
    if scope.as_deref() == Some("import") {
        return Ok(None);
    }

    let group = required(entry.group_id.as_deref(), "groupId", properties)?;
    let name = required(entry.artifact_id.as_deref(), "artifactId", properties)?;
    let version = resolve_optional(entry.version.as_deref(), properties)?;
    if let Some(version) = &version {
        check_version(&group, &name, version)?;
    }
    let dep_type = resolve_optional(entry.dep_type.as_deref(), properties)?;
    let classifier = resolve_optional(entry.classifier.as_deref(), properties)?;
    let (classifier, extension) = packaging_of(dep_type.as_deref(), classifier);

    let key = ArtifactKey {
        group,
        name,
        classifier,
        extension,
    };
    let managed = ManagedDependency {
        version,
        scope: scope.as_deref().map(parse_scope).transpose()?,
        exclusions: exclusions_of(entry, properties)?,
    };
    Ok(Some((key, managed)))
}

fn resolve_dependency(
    entry: &RawDependency,
    properties: &HashMap<String, String>,
    management: &HashMap<ArtifactKey, ManagedDependency>,
) -> Result<Option<DependencyDeclaration>, String> {
    let scope_text = resolve_optional(entry.scope.as_deref(), properties)?;
    // System-scoped files live outside any repository
    if scope_text
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("system"))
    {
        return Ok(None);
    }

    let group = required(entry.group_id.as_deref(), "groupId", properties)?;
    let name = required(entry.artifact_id.as_deref(), "artifactId", properties)?;
    let dep_type = resolve_optional(entry.dep_type.as_deref(), properties)?;
    let classifier = resolve_optional(entry.classifier.as_deref(), properties)?;
    let (classifier, extension) = packaging_of(dep_type.as_deref(), classifier);

    let key = ArtifactKey {
        group: group.clone(),
        name: name.clone(),
        classifier: classifier.clone(),
        extension: extension.clone(),
    };
    let managed = management.get(&key);

    let version = match resolve_optional(entry.version.as_deref(), properties)? {
        Some(version) => version,
        None => managed
            .and_then(|m| m.version.clone())
            .ok_or_else(|| format!("dependency {group}:{name} has no version"))?,
    };
    check_version(&group, &name, &version)?;

    let scope = match (&scope_text, managed.and_then(|m| m.scope)) {
        (Some(text), _) => parse_scope(text)?,
        (None, Some(scope)) => scope,
        (None, None) => Scope::Compile,
    };

    let optional = resolve_optional(entry.optional.as_deref(), properties)?
        .is_some_and(|o| o.eq_ignore_ascii_case("true"));

    let coordinate = Coordinate::new(group, name, version)
        .map_err(|e| e.to_string())?
        .with_classifier(classifier.as_deref())
        .with_extension(extension);
    coordinate.validate().map_err(|e| e.to_string())?;

    let mut declaration = DependencyDeclaration::new(coordinate, scope).optional(optional);
    declaration.scope_explicit = scope_text.is_some();
    declaration.exclusions = exclusions_of(entry, properties)?;
    if let Some(managed) = managed {
        for exclusion in &managed.exclusions {
            if !declaration.exclusions.contains(exclusion) {
                declaration.exclusions.push(exclusion.clone());
            }
        }
    }
    Ok(Some(declaration))
}
