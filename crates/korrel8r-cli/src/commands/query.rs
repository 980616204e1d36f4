//! Query command implementation.

use crate::cli::QueryArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::{Formatter, Primary};
use korrel8r_core::UriRef;

/// Execute the query command.
pub fn execute_query(args: QueryArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let link = UriRef::parse(args.link.trim())?;
    let query = config.domains().link_to_query(&link)?;
    formatter.format_translation(&query, &link, Primary::Query)
}
