//! CLI command definitions and argument parsing.

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// korrel8r-link - Translate between korrel8r queries and console links.
#[derive(Debug, Parser)]
#[command(name = "korrel8r-link")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "KORREL8R_CONFIG")]
    pub config: Option<PathBuf>,

    /// More logging on stderr (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (bare values)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a query to a console link
    Link(LinkArgs),

    /// Convert a console link to a query
    Query(QueryArgs),

    /// Find the rule that produced a query in a graph response
    Rule(RuleArgs),

    /// Summarize a graph response
    Graph(GraphArgs),

    /// Print the request body for a correlation search
    Request(RequestArgs),
}

/// Time window and limits shared by commands that take a constraint.
#[derive(Debug, Default, clap::Args)]
pub struct ConstraintArgs {
    /// Start of the time window (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub start: Option<DateTime<Utc>>,

    /// End of the time window (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub end: Option<DateTime<Utc>>,

    /// Maximum results per query
    #[arg(long)]
    pub limit: Option<u64>,

    /// Query timeout in nanoseconds
    #[arg(long)]
    pub timeout_ns: Option<u64>,
}

/// Arguments for the link command.
#[derive(Debug, Parser)]
pub struct LinkArgs {
    /// Query (format: domain:class:selector)
    pub query: String,

    #[command(flatten)]
    pub constraint: ConstraintArgs,

    /// Console base URL to make the link absolute (overrides config)
    #[arg(short, long)]
    pub base: Option<String>,
}

/// Arguments for the query command.
#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// Console link, relative or absolute
    pub link: String,
}

/// Arguments for the rule command.
#[derive(Debug, Parser)]
pub struct RuleArgs {
    /// Graph response JSON file
    #[arg(short, long)]
    pub graph: PathBuf,

    /// Query (format: domain:class:selector)
    pub query: String,

    /// Result count reported for the query
    pub count: u64,
}

/// Arguments for the graph command.
#[derive(Debug, Parser)]
pub struct GraphArgs {
    /// Graph response JSON file
    #[arg(short, long)]
    pub graph: PathBuf,
}

/// Arguments for the request command.
#[derive(Debug, Parser)]
pub struct RequestArgs {
    /// Start query (format: domain:class:selector)
    pub query: String,

    /// Neighbourhood depth (clamped to 1-10)
    #[arg(short, long, conflicts_with = "goal")]
    pub depth: Option<u32>,

    /// Goal class (format: domain:class)
    #[arg(long)]
    pub goal: Option<String>,

    #[command(flatten)]
    pub constraint: ConstraintArgs,
}

fn parse_instant(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 time '{}': {}", s, e))
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl ConstraintArgs {
    /// Build a constraint, or `None` if no flag was given
    pub fn to_constraint(&self) -> Option<korrel8r_core::Constraint> {
        let mut c = korrel8r_core::Constraint::default();
        if let Some(start) = self.start {
            c = c.with_start(start);
        }
        if let Some(end) = self.end {
            c = c.with_end(end);
        }
        if let Some(limit) = self.limit {
            c = c.with_limit(limit);
        }
        if let Some(ns) = self.timeout_ns {
            c = c.with_timeout_ns(ns);
        }
        (!c.is_empty()).then_some(c)
    }
}
