//! Link command implementation.

use crate::cli::LinkArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::{Formatter, Primary};
use korrel8r_core::Query;

/// Execute the link command.
pub fn execute_link(args: LinkArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let query = Query::parse(args.query.trim())?;
    let constraint = args.constraint.to_constraint();
    let mut link = config.domains().query_to_link(&query, constraint.as_ref())?;

    // Make the link absolute if a console base URL is known
    if let Some(base) = args.base.as_ref().or(config.console.base_url.as_ref()) {
        link = link.resolve(base)?;
    }

    formatter.format_translation(&query, &link, Primary::Link)
}
