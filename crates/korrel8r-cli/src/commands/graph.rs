//! Graph command implementation.

use crate::cli::GraphArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use korrel8r_core::{api, Graph};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Read a graph response JSON file.
pub fn load_graph(path: &Path) -> Result<Graph> {
    let graph_file_error = |reason: String| CliError::GraphFile {
        path: path.to_path_buf(),
        reason,
    };
    let contents = fs::read_to_string(path).map_err(|e| graph_file_error(e.to_string()))?;
    let wire: api::Graph =
        serde_json::from_str(&contents).map_err(|e| graph_file_error(e.to_string()))?;
    let graph = Graph::from_api(&wire);
    debug!(
        path = %path.display(),
        nodes = graph.nodes().len(),
        edges = graph.edges().count(),
        "loaded graph"
    );
    if !graph.errors().is_empty() {
        warn!(count = graph.errors().len(), "graph has unresolved edges");
    }
    Ok(graph)
}

/// Execute the graph command.
pub fn execute_graph(args: GraphArgs, formatter: &Formatter) -> Result<String> {
    let graph = load_graph(&args.graph)?;
    formatter.format_graph(&graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use tempfile::TempDir;

    #[test]
    fn test_graph_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(
            &path,
            r#"{"nodes": [{"class": "a:x", "count": 1}, {"class": "b:y", "count": 2}],
                "edges": [{"start": "a:x", "goal": "b:y"}]}"#,
        )
        .unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let out = execute_graph(GraphArgs { graph: path }, &formatter).unwrap();
        assert_eq!(out, "a:x\nb:y");
    }

    #[test]
    fn test_bad_graph_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_graph(&missing), Err(CliError::GraphFile { .. })));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{nodes").unwrap();
        assert!(matches!(load_graph(&bad), Err(CliError::GraphFile { .. })));
    }
}
