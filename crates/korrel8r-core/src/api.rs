//! Wire shapes exchanged with the korrel8r REST API
//!
//! These mirror the JSON bodies exactly; the typed model in [`crate::graph`]
//! and [`crate::constraint`] is built from them.

use serde::{Deserialize, Serialize};

/// A query string with the number of results it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCount {
    /// Query string, `domain:class:selector`
    pub query: String,
    /// Number of results
    pub count: u64,
}

/// A graph node: one class and the queries that reached it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Class string, `domain:class`
    pub class: String,
    /// Total result count for the class
    pub count: u64,
    /// Queries that reached this class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries: Option<Vec<QueryCount>>,
}

/// A named rule and the goal queries it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name
    pub name: String,
    /// Queries the rule produced
    #[serde(default)]
    pub queries: Vec<QueryCount>,
}

/// A graph edge between two class ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Start class id
    pub start: String,
    /// Goal class id
    pub goal: String,
    /// Rules that connect start to goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
}

/// A correlation graph response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    /// Nodes in response order
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Edges in response order
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Time window and result limits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// ISO-8601 start instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// ISO-8601 end instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Maximum results per query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Query timeout in nanoseconds, as a decimal string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Starting point of a graph search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Start {
    /// Start queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries: Option<Vec<String>>,
    /// Constraint applied to every query in the search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
}

/// Body of `POST /graphs/neighbours`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbours {
    /// Search start
    pub start: Start,
    /// Maximum traversal depth
    pub depth: u32,
}

/// Body of `POST /graphs/goals`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    /// Search start
    pub start: Start,
    /// Goal class strings
    pub goals: Vec<String>,
}
