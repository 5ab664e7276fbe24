//! CLI error types and result alias.

#![allow(unused_assignments)]

use miette::Diagnostic;
use pgbranch_migrate::MigrationError;
use pgbranch_postgres::PgError;
use pgbranch_schema::SchemaError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(pgbranch::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(pgbranch::config))]
    Config(String),

    /// Snapshot error
    #[error("Schema error: {0}")]
    #[diagnostic(code(pgbranch::schema))]
    Schema(#[from] SchemaError),

    /// Migration error
    #[error("{0}")]
    #[diagnostic(code(pgbranch::migration))]
    Migration(#[from] MigrationError),

    /// Database error
    #[error("Database error: {0}")]
    #[diagnostic(code(pgbranch::database))]
    Database(String),

    /// Command error
    #[error("{0}")]
    #[diagnostic(code(pgbranch::command))]
    Command(String),
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<PgError> for CliError {
    fn from(err: PgError) -> Self {
        match err {
            PgError::Config(msg) => CliError::Config(msg),
            other => CliError::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Schema(SchemaError::Json(err))
    }
}
