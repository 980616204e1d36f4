//! Correlation graph: classes as nodes, rule relationships as edges
//!
//! Construction from an API response never fails. Malformed pieces are
//! captured where they occur (a query count keeps its parse error, a node
//! keeps its class error, an edge with a missing endpoint is recorded in
//! [`Graph::errors`]) so the rest of the graph stays usable.

use crate::api;
use crate::error::{Error, Result};
use crate::query::{Class, Query};
use std::collections::HashMap;
use tracing::warn;

/// A query with the number of results it produced
///
/// If the query string does not parse, the error is kept in place of the
/// query instead of being returned.
#[derive(Debug, Clone)]
pub struct QueryCount {
    /// Parsed query, or the parse failure
    pub query: Result<Query>,

    /// Number of results
    pub count: u64,
}

impl QueryCount {
    /// Build from a raw query string. Never fails.
    pub fn new(query: &str, count: u64) -> Self {
        Self {
            query: Query::parse(query),
            count,
        }
    }

    /// Build from the wire shape
    pub fn from_api(wire: &api::QueryCount) -> Self {
        Self::new(&wire.query, wire.count)
    }

    /// Captured parse error, if any
    pub fn error(&self) -> Option<&Error> {
        self.query.as_ref().err()
    }

    /// Compare with a possibly missing value
    ///
    /// # Errors
    /// Comparing with `None` is a caller bug and fails with
    /// [`Error::MissingOperand`] rather than answering `false`.
    pub fn try_eq(&self, other: Option<&QueryCount>) -> Result<bool> {
        match other {
            Some(other) => Ok(self == other),
            None => Err(Error::MissingOperand(self.to_string())),
        }
    }
}

impl PartialEq for QueryCount {
    fn eq(&self, other: &Self) -> bool {
        if self.count != other.count {
            return false;
        }
        match (&self.query, &other.query) {
            (Ok(a), Ok(b)) => a.to_string() == b.to_string(),
            (Err(a), Err(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for QueryCount {}

impl std::fmt::Display for QueryCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.query {
            Ok(q) => write!(f, "{} ({})", q, self.count),
            Err(e) => write!(f, "{} ({})", e, self.count),
        }
    }
}

/// A named rule and the goal queries it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Rule name
    pub name: String,

    /// Queries produced by the rule, in response order
    pub queries: Vec<QueryCount>,
}

impl Rule {
    fn from_api(wire: &api::Rule) -> Self {
        Self {
            name: wire.name.clone(),
            queries: wire.queries.iter().map(QueryCount::from_api).collect(),
        }
    }
}

/// Whether a node's class string parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    /// The class parsed; queries are available
    Resolved {
        /// Parsed class
        class: Class,
        /// Queries that reached the class
        queries: Vec<QueryCount>,
    },

    /// The class string did not parse
    Degraded {
        /// Parse failure
        error: Error,
    },
}

/// A graph node for one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Raw class string from the API, always set
    pub id: String,

    /// Result count for the class
    pub count: u64,

    /// Parsed class and queries, or the parse failure
    pub state: NodeState,
}

impl Node {
    /// Build from the wire shape. Never fails.
    pub fn from_api(wire: &api::Node) -> Self {
        let state = match Class::parse(&wire.class) {
            Ok(class) => NodeState::Resolved {
                class,
                queries: wire
                    .queries
                    .iter()
                    .flatten()
                    .map(QueryCount::from_api)
                    .collect(),
            },
            Err(error) => {
                warn!(class = %wire.class, %error, "degraded graph node");
                NodeState::Degraded { error }
            }
        };
        Self {
            id: wire.class.clone(),
            count: wire.count,
            state,
        }
    }

    /// Parsed class, if the node is resolved
    pub fn class(&self) -> Option<&Class> {
        match &self.state {
            NodeState::Resolved { class, .. } => Some(class),
            NodeState::Degraded { .. } => None,
        }
    }

    /// Queries for the node; empty when degraded
    pub fn queries(&self) -> &[QueryCount] {
        match &self.state {
            NodeState::Resolved { queries, .. } => queries,
            NodeState::Degraded { .. } => &[],
        }
    }

    /// Class parse error, if the node is degraded
    pub fn error(&self) -> Option<&Error> {
        match &self.state {
            NodeState::Resolved { .. } => None,
            NodeState::Degraded { error } => Some(error),
        }
    }
}

/// Stable index of a node inside its [`Graph`]
pub type NodeIndex = usize;

/// An edge between two nodes of the owning graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Start node index
    pub start: NodeIndex,

    /// Goal node index
    pub goal: NodeIndex,

    /// Rules connecting start to goal, in response order
    pub rules: Vec<Rule>,
}

/// An edge with its endpoints resolved against the graph
#[derive(Debug, Clone, Copy)]
pub struct EdgeRef<'g> {
    graph: &'g Graph,
    edge: &'g Edge,
}

impl<'g> EdgeRef<'g> {
    /// Start node
    pub fn start(&self) -> &'g Node {
        &self.graph.nodes[self.edge.start]
    }

    /// Goal node
    pub fn goal(&self) -> &'g Node {
        &self.graph.nodes[self.edge.goal]
    }

    /// Rules connecting start to goal
    pub fn rules(&self) -> &'g [Rule] {
        &self.edge.rules
    }
}

/// A correlation graph owning its nodes and edges
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<String, NodeIndex>,
    edges: Vec<Edge>,
    errors: Vec<Error>,
}

impl Graph {
    /// Build from an API response. Never fails.
    ///
    /// Nodes keep first-seen order; a duplicate id overwrites the earlier
    /// node in place. Edges keep response order; an edge whose endpoint is
    /// unknown is dropped and recorded in [`Graph::errors`].
    pub fn from_api(wire: &api::Graph) -> Self {
        let mut graph = Self::default();
        for n in &wire.nodes {
            let node = Node::from_api(n);
            match graph.index.get(&node.id) {
                Some(&i) => graph.nodes[i] = node,
                None => {
                    graph.index.insert(node.id.clone(), graph.nodes.len());
                    graph.nodes.push(node);
                }
            }
        }
        for e in &wire.edges {
            match (graph.index.get(&e.start), graph.index.get(&e.goal)) {
                (Some(&start), Some(&goal)) => graph.edges.push(Edge {
                    start,
                    goal,
                    rules: e.rules.iter().flatten().map(Rule::from_api).collect(),
                }),
                (start, _) => {
                    let missing = if start.is_none() { &e.start } else { &e.goal };
                    let error = Error::UnresolvedEdge {
                        start: e.start.clone(),
                        goal: e.goal.clone(),
                        missing: missing.clone(),
                    };
                    warn!(%error, "dropping graph edge");
                    graph.errors.push(error);
                }
            }
        }
        graph
    }

    /// Nodes in first-seen order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in response order, with endpoints resolved
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.edges.iter().map(move |edge| EdgeRef { graph: self, edge })
    }

    /// Look up a node by class id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Edges that were dropped during construction
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// True if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the rule that produced a query count
    ///
    /// Scans edges whose goal is the query's class, then their rules, then
    /// each rule's queries, all in response order; the first rule holding an
    /// equal query count wins. Returns `None` for an unparsed query, an
    /// unknown goal class, or no matching rule.
    pub fn find_rule(&self, qc: &QueryCount) -> Option<&Rule> {
        let query = qc.query.as_ref().ok()?;
        let goal = *self.index.get(&query.class.to_string())?;
        self.edges
            .iter()
            .filter(|e| e.goal == goal)
            .flat_map(|e| e.rules.iter())
            .find(|rule| rule.queries.iter().any(|q| q == qc))
    }
}
