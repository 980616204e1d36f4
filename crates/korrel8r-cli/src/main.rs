//! korrel8r-link - Translate between korrel8r queries and console links.

use clap::Parser;
use korrel8r_cli::commands;
use korrel8r_cli::config::OutputFormat;
use korrel8r_cli::{Cli, CliError, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&Formatter::new(OutputFormat::Table, !cli.no_color), &e),
    };

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match run(cli.command, &config, &formatter) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => fail(&formatter, &e),
    }
}

fn fail(formatter: &Formatter, error: &CliError) -> ! {
    eprintln!("{}", formatter.error(&error.to_string()));
    std::process::exit(1);
}

/// Log to stderr; RUST_LOG wins over -v
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(command: Command, config: &Config, formatter: &Formatter) -> korrel8r_cli::Result<String> {
    match command {
        Command::Link(args) => commands::execute_link(args, config, formatter),
        Command::Query(args) => commands::execute_query(args, config, formatter),
        Command::Rule(args) => commands::execute_rule(args, formatter),
        Command::Graph(args) => commands::execute_graph(args, formatter),
        Command::Request(args) => commands::execute_request(args, config, formatter),
    }
}
