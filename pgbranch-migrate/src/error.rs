//! Error types for the migration engine.

use pgbranch_schema::SchemaError;
use thiserror::Error;

use crate::apply::ApplyResult;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur while rendering or applying a change set.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema snapshot error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A change rendered to no SQL at all.
    #[error("Cannot render change: {0}")]
    Render(String),

    /// Database operation error.
    #[error("Database error: {0}")]
    Database(String),

    /// A transactional apply stopped on a failed statement. Nothing was
    /// committed.
    #[error("Migration failed: {reason}")]
    ApplyFailed {
        /// Error of the failing statement.
        reason: String,
        /// What ran before the failure.
        result: Box<ApplyResult>,
    },

    /// The apply was cancelled before it finished. Any open transaction was
    /// rolled back.
    #[error("Migration cancelled: {reason}")]
    Cancelled {
        /// Why the apply stopped.
        reason: String,
        /// What ran before cancellation.
        result: Box<ApplyResult>,
    },

    /// General migration error.
    #[error("Migration error: {0}")]
    Other(String),
}

impl MigrationError {
    /// Create a render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create an other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// The partial result carried by a failed or cancelled apply.
    pub fn apply_result(&self) -> Option<&ApplyResult> {
        match self {
            Self::ApplyFailed { result, .. } | Self::Cancelled { result, .. } => Some(result.as_ref()),
            _ => None,
        }
    }

    /// Check if this error came from the database rather than the engine.
    pub fn is_database(&self) -> bool {
        matches!(self, Self::Database(_) | Self::ApplyFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrationError::database("relation \"users\" already exists");
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_apply_result_is_exposed() {
        let err = MigrationError::Cancelled {
            reason: "timed out".to_string(),
            result: Box::default(),
        };
        assert!(err.apply_result().is_some());
        assert!(MigrationError::render("x").apply_result().is_none());
    }

    #[test]
    fn test_is_database() {
        assert!(MigrationError::database("boom").is_database());
        assert!(!MigrationError::render("boom").is_database());
    }
}
