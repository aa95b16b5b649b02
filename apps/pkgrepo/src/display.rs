//! Output rendering and formatting

use pkgrepo_resolver::ResolvedGraph;
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::PathBuf;

/// What a command produced
#[derive(Debug)]
pub enum CommandOutput {
    /// Local artifact paths, root first
    Paths(Vec<PathBuf>),
    /// Resolved graph for `tree`
    Tree(ResolvedGraph),
    /// Local path of a single coordinate
    Path(PathBuf),
}

/// Output renderer for CLI results
#[derive(Debug, Clone, Copy)]
pub struct OutputRenderer {
    json_output: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Render a command result to stdout
    pub fn render_result(self, output: &CommandOutput) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.write_result(&mut stdout, output)
    }

    fn write_result(self, out: &mut impl Write, output: &CommandOutput) -> io::Result<()> {
        if self.json_output {
            let value = to_json(output);
            let text = serde_json::to_string_pretty(&value).map_err(io::Error::other)?;
            writeln!(out, "{text}")
        } else {
            write_text(out, output)
        }
    }
}

fn write_text(out: &mut impl Write, output: &CommandOutput) -> io::Result<()> {
    match output {
        CommandOutput::Paths(paths) => {
            for path in paths {
                writeln!(out, "{}", path.display())?;
            }
            Ok(())
        }
        CommandOutput::Tree(graph) => {
            write!(out, "{}", graph.render_tree())?;
            if !graph.mediations().is_empty() {
                writeln!(out)?;
            }
            for mediation in graph.mediations() {
                let requester = mediation
                    .requested_by
                    .as_ref()
                    .map_or_else(|| "root".to_string(), ToString::to_string);
                writeln!(
                    out,
                    "note: {} {} requested by {requester} omitted for {}",
                    mediation.artifact.module(),
                    mediation.loser,
                    mediation.winner
                )?;
            }
            Ok(())
        }
        CommandOutput::Path(path) => writeln!(out, "{}", path.display()),
    }
}

fn to_json(output: &CommandOutput) -> Value {
    match output {
        CommandOutput::Paths(paths) => paths
            .iter()
            .map(|p| Value::String(p.display().to_string()))
            .collect(),
        CommandOutput::Path(path) => Value::String(path.display().to_string()),
        CommandOutput::Tree(graph) => {
            let nodes: Vec<Value> = graph
                .nodes_preorder()
                .into_iter()
                .map(|node| {
                    json!({
                        "coordinate": node.coordinate.to_string(),
                        "scope": node.coordinate.scope().as_str(),
                        "depth": node.depth,
                        "children": node
                            .children
                            .iter()
                            .map(|c| graph.node(*c).coordinate.to_string())
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();
            let mediations: Vec<Value> = graph
                .mediations()
                .iter()
                .map(|m| {
                    json!({
                        "module": m.artifact.module().to_string(),
                        "winner": m.winner,
                        "loser": m.loser,
                        "requested_by": m.requested_by.as_ref().map(ToString::to_string),
                    })
                })
                .collect();
            let roots: Vec<String> = graph
                .roots()
                .iter()
                .map(|id| graph.node(*id).coordinate.to_string())
                .collect();
            json!({ "roots": roots, "nodes": nodes, "mediations": mediations })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(json: bool, output: &CommandOutput) -> String {
        let mut buffer = Vec::new();
        OutputRenderer::new(json)
            .write_result(&mut buffer, output)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_paths_text_and_json() {
        let output = CommandOutput::Paths(vec![
            PathBuf::from("/repo/g/a/1/a-1.jar"),
            PathBuf::from("/repo/g/b/2/b-2.jar"),
        ]);
        assert_eq!(
            render(false, &output),
            "/repo/g/a/1/a-1.jar\n/repo/g/b/2/b-2.jar\n"
        );
        let parsed: Vec<String> = serde_json::from_str(&render(true, &output)).unwrap();
        assert_eq!(parsed, vec!["/repo/g/a/1/a-1.jar", "/repo/g/b/2/b-2.jar"]);
    }

    #[test]
    fn test_empty_tree_json() {
        let value: Value =
            serde_json::from_str(&render(true, &CommandOutput::Tree(ResolvedGraph::default())))
                .unwrap();
        assert_eq!(value["roots"], json!([]));
        assert_eq!(value["mediations"], json!([]));
    }
}
