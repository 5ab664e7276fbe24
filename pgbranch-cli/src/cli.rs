//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// pgbranch - compare and merge PostgreSQL schemas
#[derive(Parser, Debug)]
#[command(name = "pgbranch")]
#[command(version)]
#[command(about = "pgbranch - compare and merge PostgreSQL schemas", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Server URL; bare database names are resolved against it
    #[arg(long, global = true, env = "PGBRANCH_DATABASE_URL")]
    pub url: Option<String>,

    /// Path to the config file (defaults to ./pgbranch.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show schema differences between two schemas
    Diff(DiffArgs),

    /// Merge schema changes from a source into a target database
    Merge(MergeArgs),

    /// Save a schema snapshot as JSON
    Snapshot(SnapshotArgs),
}

// =============================================================================
// Diff Command
// =============================================================================

/// Arguments for the `diff` command.
///
/// A schema is a `postgres://` URL, a `.json` snapshot file, or a database
/// name on the configured server.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Schema to compare from
    pub from: String,

    /// Schema to compare to
    pub to: String,

    /// Show summary statistics only
    #[arg(long, conflicts_with_all = ["sql", "json"])]
    pub stat: bool,

    /// Show SQL statements to apply changes
    #[arg(long, conflicts_with = "json")]
    pub sql: bool,

    /// Print a machine-readable JSON report
    #[arg(long)]
    pub json: bool,
}

// =============================================================================
// Merge Command
// =============================================================================

/// Arguments for the `merge` command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Schema whose changes are merged
    pub source: String,

    /// Database receiving the changes
    pub target: String,

    /// Show SQL without applying changes
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a migration file instead of applying
    #[arg(long)]
    pub migration_file: bool,

    /// Directory for migration files
    #[arg(long)]
    pub migration_dir: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub force: bool,

    /// Keep going after a failed statement instead of rolling back
    #[arg(long)]
    pub continue_on_error: bool,

    /// Abort the apply after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

// =============================================================================
// Snapshot Command
// =============================================================================

/// Arguments for the `snapshot` command
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Schema to capture
    pub reference: String,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}
