//! Request command implementation.

use crate::cli::RequestArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use korrel8r_core::{Search, SearchType};

/// Execute the request command.
///
/// The search is validated against the console domains before the body is
/// printed, so a query that could never be linked is rejected here.
pub fn execute_request(
    args: RequestArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<String> {
    let search_type = match (args.goal, args.depth) {
        (Some(goal), _) => SearchType::Goal(goal),
        (None, Some(depth)) => SearchType::depth(depth),
        (None, None) => SearchType::default(),
    };
    let mut search = Search::new(args.query).with_type(search_type);
    if let Some(constraint) = args.constraint.to_constraint() {
        search = search.with_constraint(constraint);
    }
    search.validate(&config.domains())?;
    formatter.format_request(&search.request())
}
