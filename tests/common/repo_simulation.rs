//! Repository simulation for resolution and download workflows
//!
//! A `MockRepository` is a Maven-layout directory in a temp dir. Tests use
//! it directly as a `file://` remote, or mirror it onto an httpmock server
//! to count requests.

use httpmock::{Mock, MockServer};
use pkgrepo_hash::{Checksum, ChecksumAlgorithm};
use pkgrepo_repository::RepositoryRegistry;
use pkgrepo_types::Coordinate;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A metadata document under construction
#[derive(Debug, Clone)]
pub struct Pom {
    gav: String,
    packaging: Option<String>,
    parent: Option<String>,
    properties: Vec<(String, String)>,
    managed: Vec<String>,
    dependencies: Vec<String>,
}

impl Pom {
    pub fn new(gav: &str) -> Self {
        Self {
            gav: gav.to_string(),
            packaging: None,
            parent: None,
            properties: Vec::new(),
            managed: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Compile dependency on `g:a:v`
    pub fn dep(self, gav: &str) -> Self {
        self.dep_with(gav, "")
    }

    /// Dependency with extra child elements such as `<scope>test</scope>`.
    /// An empty version leaves `<version>` out.
    pub fn dep_with(mut self, gav: &str, extra: &str) -> Self {
        self.dependencies.push(dependency(gav, extra));
        self
    }

    /// `<dependencyManagement>` entry
    pub fn managed(mut self, gav: &str, extra: &str) -> Self {
        self.managed.push(dependency(gav, extra));
        self
    }

    pub fn parent(mut self, gav: &str) -> Self {
        self.parent = Some(gav.to_string());
        self
    }

    pub fn property(mut self, name: &str, value: &str) -> Self {
        self.properties.push((name.to_string(), value.to_string()));
        self
    }

    pub fn packaging(mut self, packaging: &str) -> Self {
        self.packaging = Some(packaging.to_string());
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::parse(&self.gav).expect("valid test coordinate")
    }

    fn has_jar(&self) -> bool {
        self.packaging.as_deref().is_none_or(|p| p != "pom")
    }

    pub fn to_xml(&self) -> String {
        let (g, a, v) = split_gav(&self.gav);
        let mut xml = String::from("<?xml version=\"1.0\"?>\n<project>\n");
        if let Some(parent) = &self.parent {
            let (pg, pa, pv) = split_gav(parent);
            let _ = writeln!(
                xml,
                "  <parent><groupId>{pg}</groupId><artifactId>{pa}</artifactId><version>{pv}</version></parent>"
            );
        }
        let _ = writeln!(
            xml,
            "  <groupId>{g}</groupId>\n  <artifactId>{a}</artifactId>\n  <version>{v}</version>"
        );
        if let Some(packaging) = &self.packaging {
            let _ = writeln!(xml, "  <packaging>{packaging}</packaging>");
        }
        if !self.properties.is_empty() {
            xml.push_str("  <properties>\n");
            for (name, value) in &self.properties {
                let _ = writeln!(xml, "    <{name}>{value}</{name}>");
            }
            xml.push_str("  </properties>\n");
        }
        if !self.managed.is_empty() {
            let _ = writeln!(
                xml,
                "  <dependencyManagement><dependencies>{}</dependencies></dependencyManagement>",
                self.managed.concat()
            );
        }
        if !self.dependencies.is_empty() {
            let _ = writeln!(xml, "  <dependencies>{}</dependencies>", self.dependencies.concat());
        }
        xml.push_str("</project>\n");
        xml
    }
}

fn split_gav(gav: &str) -> (&str, &str, &str) {
    let mut parts = gav.splitn(3, ':');
    (
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
    )
}

fn dependency(gav: &str, extra: &str) -> String {
    let (g, a, v) = split_gav(gav);
    let version = if v.is_empty() {
        String::new()
    } else {
        format!("<version>{v}</version>")
    };
    format!("<dependency><groupId>{g}</groupId><artifactId>{a}</artifactId>{version}{extra}</dependency>")
}

/// Maven-layout repository on disk
pub struct MockRepository {
    dir: TempDir,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file_url(&self) -> String {
        url::Url::from_directory_path(self.dir.path())
            .expect("absolute temp dir")
            .to_string()
    }

    /// Publish a document, plus a jar unless the packaging is `pom`.
    /// The jar's content is the coordinate text.
    pub fn publish(&self, pom: &Pom) -> &Self {
        let coordinate = pom.coordinate();
        self.write(&coordinate.with_extension("pom"), pom.to_xml().as_bytes());
        if pom.has_jar() {
            self.write(&coordinate, pom.gav.as_bytes());
        }
        self
    }

    /// Write an arbitrary artifact file
    pub fn write(&self, coordinate: &Coordinate, data: &[u8]) -> PathBuf {
        let path = self.artifact_path(coordinate);
        std::fs::create_dir_all(path.parent().expect("nested path")).expect("create dirs");
        std::fs::write(&path, data).expect("write artifact");
        path
    }

    /// Publish a sidecar next to `coordinate` holding the digest of `data`
    pub fn write_sidecar(&self, coordinate: &Coordinate, algorithm: ChecksumAlgorithm, data: &[u8]) {
        let path = self.artifact_path(coordinate);
        let checksum = Checksum::from_data(algorithm, data);
        std::fs::write(
            pkgrepo_repository::with_suffix(&path, algorithm),
            checksum.sidecar_contents(),
        )
        .expect("write sidecar");
    }

    pub fn artifact_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.dir
            .path()
            .join(RepositoryRegistry::relative_path(coordinate))
    }

    /// Register one GET mock per file under `prefix`, keyed by relative path
    pub fn serve<'a>(&self, server: &'a MockServer, prefix: &str) -> BTreeMap<String, Mock<'a>> {
        let mut mocks = BTreeMap::new();
        for file in files_under(self.dir.path()) {
            let relative = file
                .strip_prefix(self.dir.path())
                .expect("file under root")
                .to_string_lossy()
                .replace('\\', "/");
            let body = std::fs::read(&file).expect("read file");
            let url_path = format!("{prefix}/{relative}");
            let mock = server.mock(|when, then| {
                when.method(httpmock::Method::GET).path(url_path);
                then.status(200).body(body);
            });
            mocks.insert(relative, mock);
        }
        mocks
    }
}

fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                pending.push(path);
            } else {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}
