//! Command implementations.
//!
//! Each command returns its formatted output; `main` prints it.

pub mod graph;
pub mod link;
pub mod query;
pub mod request;
pub mod rule;

pub use self::graph::{execute_graph, load_graph};
pub use self::link::execute_link;
pub use self::query::execute_query;
pub use self::request::execute_request;
pub use self::rule::execute_rule;
