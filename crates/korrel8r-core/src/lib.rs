//! korrel8r Core
//!
//! The domain-translation and correlation-graph model behind the
//! troubleshooting panel. It has no I/O: callers hand it raw API responses
//! and console URLs and get typed values back.
//!
//! ## Key Concepts
//!
//! - **Query**: `domain:class:selector`, the uniform cross-domain query string
//! - **Constraint**: time window and limits, mapped losslessly to the wire
//! - **UriRef**: a console link that may be relative or absolute
//! - **Domain**: converts between queries and console links for one signal domain
//! - **Graph**: classes as nodes, rules as edges, with rule lookup by query
//!
//! ## Error policy
//!
//! Leaf values (query, class, URI, constraint) fail at the parse boundary.
//! Aggregates (query counts, nodes, graphs) capture per-element errors so
//! one malformed element never invalidates the whole response.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod constraint;
pub mod domain;
pub mod error;
pub mod graph;
pub mod query;
pub mod search;
pub mod uri_ref;

// Re-exports for convenience
pub use constraint::Constraint;
pub use domain::{Domain, Domains};
pub use error::{Error, Result};
pub use graph::{Edge, EdgeRef, Graph, Node, NodeState, QueryCount, Rule};
pub use query::{Class, Query};
pub use search::{Request, Search, SearchType};
pub use uri_ref::{join_path, SearchParams, UriRef};
