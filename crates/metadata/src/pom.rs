//! POM documents as written, before inheritance and interpolation

use roxmltree::{Document, Node, ParsingOptions};

#[derive(Debug, Clone, Default)]
pub(crate) struct RawPom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<RawParent>,
    /// In document order; later entries win
    pub properties: Vec<(String, String)>,
    pub dependency_management: Vec<RawDependency>,
    pub dependencies: Vec<RawDependency>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawParent {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawDependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub classifier: Option<String>,
    pub dep_type: Option<String>,
    pub optional: Option<String>,
    pub exclusions: Vec<(String, String)>,
}

impl RawDependency {
    /// Identity used when a child document overrides an inherited entry
    pub fn merge_key(&self) -> (Option<&str>, Option<&str>, Option<&str>, Option<&str>) {
        (
            self.group_id.as_deref(),
            self.artifact_id.as_deref(),
            self.dep_type.as_deref(),
            self.classifier.as_deref(),
        )
    }
}

/// Parse the XML text of a POM.
///
/// Errors carry a message only; the caller attaches the coordinate.
pub(crate) fn parse(xml: &str) -> Result<RawPom, String> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document =
        Document::parse_with_options(xml, options).map_err(|e| format!("invalid XML: {e}"))?;
    let project = document.root_element();
    if project.tag_name().name() != "project" {
        return Err(format!(
            "expected <project> root element, found <{}>",
            project.tag_name().name()
        ));
    }

    let parent = child(project, "parent").map(parse_parent).transpose()?;
    let dependency_management = match child(project, "dependencyManagement") {
        Some(management) => parse_dependencies(management),
        None => Vec::new(),
    };

    Ok(RawPom {
        group_id: child_text(project, "groupId"),
        artifact_id: child_text(project, "artifactId"),
        version: child_text(project, "version"),
        packaging: child_text(project, "packaging"),
        parent,
        properties: parse_properties(project),
        dependency_management,
        dependencies: parse_dependencies(project),
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == tag)
}

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == tag)
}

fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn parse_parent(node: Node<'_, '_>) -> Result<RawParent, String> {
    let field = |tag: &str| child_text(node, tag).ok_or_else(|| format!("<parent> has no <{tag}>"));
    Ok(RawParent {
        group_id: field("groupId")?,
        artifact_id: field("artifactId")?,
        version: field("version")?,
    })
}

fn parse_properties(project: Node<'_, '_>) -> Vec<(String, String)> {
    child(project, "properties")
        .map(|props| {
            props
                .children()
                .filter(Node::is_element)
                .map(|p| {
                    let value = p.text().map(str::trim).unwrap_or_default();
                    (p.tag_name().name().to_string(), value.to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `<dependencies><dependency>...` directly under `node`
fn parse_dependencies(node: Node<'_, '_>) -> Vec<RawDependency> {
    let Some(list) = child(node, "dependencies") else {
        return Vec::new();
    };
    children(list, "dependency").map(parse_dependency).collect()
}

fn parse_dependency(node: Node<'_, '_>) -> RawDependency {
    let exclusions = child(node, "exclusions")
        .map(|list| {
            children(list, "exclusion")
                .filter_map(|ex| {
                    let group = child_text(ex, "groupId")?;
                    let name = child_text(ex, "artifactId").unwrap_or_else(|| "*".to_string());
                    Some((group, name))
                })
                .collect()
        })
        .unwrap_or_default();

    RawDependency {
        group_id: child_text(node, "groupId"),
        artifact_id: child_text(node, "artifactId"),
        version: child_text(node, "version"),
        scope: child_text(node, "scope"),
        classifier: child_text(node, "classifier"),
        dep_type: child_text(node, "type"),
        optional: child_text(node, "optional"),
        exclusions,
    }
}
