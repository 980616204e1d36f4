//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use korrel8r_core::{Graph, NodeState, Query, QueryCount, Request, Rule, UriRef};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a query and its console link.
    ///
    /// Quiet mode prints only `primary`: the link for `link`, the query for `query`.
    pub fn format_translation(
        &self,
        query: &Query,
        link: &UriRef,
        primary: Primary,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "query": query.to_string(),
                "link": link.to_string(),
            }))?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Query".to_string(), query.to_string()]);
                builder.push_record(["Link".to_string(), link.to_string()]);
                Ok(self.finish(builder, false))
            }
            OutputFormat::Quiet => Ok(match primary {
                Primary::Link => link.to_string(),
                Primary::Query => query.to_string(),
            }),
        }
    }

    /// Format the result of a rule lookup.
    pub fn format_rule(&self, qc: &QueryCount, rule: Option<&Rule>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "query": query_text(qc),
                "count": qc.count,
                "rule": rule.map(|r| r.name.as_str()),
            }))?),
            OutputFormat::Table => match rule {
                None => Ok(self.warning(&format!("No rule produced {}", qc))),
                Some(rule) => {
                    let mut builder = Builder::default();
                    builder.push_record(["Rule", "Query", "Count"]);
                    for q in &rule.queries {
                        builder.push_record([
                            rule.name.clone(),
                            query_text(q),
                            q.count.to_string(),
                        ]);
                    }
                    Ok(self.finish(builder, true))
                }
            },
            OutputFormat::Quiet => Ok(rule.map(|r| r.name.clone()).unwrap_or_default()),
        }
    }

    /// Format a graph summary.
    pub fn format_graph(&self, graph: &Graph) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_graph_json(graph),
            OutputFormat::Table => Ok(self.format_graph_table(graph)),
            OutputFormat::Quiet => {
                let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
                Ok(ids.join("\n"))
            }
        }
    }

    fn format_graph_json(&self, graph: &Graph) -> Result<String> {
        let nodes: Vec<serde_json::Value> = graph
            .nodes()
            .iter()
            .map(|n| {
                serde_json::json!({
                    "class": n.id,
                    "count": n.count,
                    "queries": n.queries().len(),
                    "error": n.error().map(|e| e.to_string()),
                })
            })
            .collect();
        let edges: Vec<serde_json::Value> = graph
            .edges()
            .map(|e| {
                serde_json::json!({
                    "start": e.start().id,
                    "goal": e.goal().id,
                    "rules": e.rules().iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
                })
            })
            .collect();
        let errors: Vec<String> = graph.errors().iter().map(|e| e.to_string()).collect();
        Ok(serde_json::to_string_pretty(&serde_json::json!({
            "nodes": nodes,
            "edges": edges,
            "errors": errors,
        }))?)
    }

    fn format_graph_table(&self, graph: &Graph) -> String {
        if graph.is_empty() {
            return self.colorize("Empty graph.", "yellow");
        }

        let mut nodes = Builder::default();
        nodes.push_record(["Class", "Count", "Queries", "Status"]);
        for node in graph.nodes() {
            let status = match &node.state {
                NodeState::Resolved { .. } => "ok".to_string(),
                NodeState::Degraded { error } => error.to_string(),
            };
            nodes.push_record([
                node.id.clone(),
                node.count.to_string(),
                node.queries().len().to_string(),
                status,
            ]);
        }

        let mut edges = Builder::default();
        edges.push_record(["Start", "Goal", "Rules"]);
        for edge in graph.edges() {
            let rules: Vec<&str> = edge.rules().iter().map(|r| r.name.as_str()).collect();
            edges.push_record([
                edge.start().id.clone(),
                edge.goal().id.clone(),
                rules.join(", "),
            ]);
        }

        let mut out = vec![self.finish(nodes, true), self.finish(edges, true)];
        out.extend(graph.errors().iter().map(|e| self.warning(&e.to_string())));
        out.join("\n")
    }

    /// Format a search request: endpoint path and JSON body.
    pub fn format_request(&self, request: &Request) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "path": request.path(),
                "body": request,
            }))?),
            OutputFormat::Table => Ok(format!(
                "{}\n{}",
                self.info(&format!("POST {}", request.path())),
                serde_json::to_string_pretty(request)?
            )),
            OutputFormat::Quiet => Ok(serde_json::to_string(request)?),
        }
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn finish(&self, builder: Builder, header: bool) -> String {
        let mut table = builder.build();
        table.with(Style::rounded());
        if header {
            table.with(Modify::new(Rows::first()).with(Alignment::center()));
        }
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Which side of a translation is the command's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primary {
    /// The console link
    Link,
    /// The query
    Query,
}

/// Query string, or the captured error for an unparsed query
fn query_text(qc: &QueryCount) -> String {
    match &qc.query {
        Ok(q) => q.to_string(),
        Err(e) => e.to_string(),
    }
}
