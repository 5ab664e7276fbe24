//! pgbranch CLI - compare and merge PostgreSQL schemas.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pgbranch_cli::cli::{Cli, Command};
use pgbranch_cli::commands;
use pgbranch_cli::error::CliResult;
use pgbranch_cli::output;
use pgbranch_cli::source::Context;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> CliResult<()> {
    let ctx = Context::load(cli.config.as_deref(), cli.url)?;

    match cli.command {
        Command::Diff(args) => commands::diff::run(&ctx, args).await,
        Command::Merge(args) => commands::merge::run(&ctx, args).await,
        Command::Snapshot(args) => commands::snapshot::run(&ctx, args).await,
    }
}
