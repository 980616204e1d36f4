//! Rule command implementation.

use crate::cli::RuleArgs;
use crate::commands::graph::load_graph;
use crate::error::Result;
use crate::output::Formatter;
use korrel8r_core::QueryCount;

/// Execute the rule command.
pub fn execute_rule(args: RuleArgs, formatter: &Formatter) -> Result<String> {
    let graph = load_graph(&args.graph)?;
    let qc = QueryCount::new(args.query.trim(), args.count);
    if let Some(e) = qc.error() {
        return Err(e.clone().into());
    }
    formatter.format_rule(&qc, graph.find_rule(&qc))
}
