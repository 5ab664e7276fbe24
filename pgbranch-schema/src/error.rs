//! Error types for the schema model and snapshot files.

// Fields are read by the derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building, reading or writing schema snapshots.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading or writing a snapshot file.
    #[error("failed to access snapshot file: {path}")]
    #[diagnostic(code(pgbranch::schema::io_error))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed snapshot JSON.
    #[error("invalid snapshot JSON: {0}")]
    #[diagnostic(code(pgbranch::schema::json))]
    Json(#[from] serde_json::Error),

    /// A value that does not describe a valid schema object.
    #[error("invalid schema object: {0}")]
    #[diagnostic(code(pgbranch::schema::invalid))]
    Invalid(String),
}

impl SchemaError {
    /// Create an invalid-object error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = SchemaError::io(
            "snap.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("snap.json"));
    }

    #[test]
    fn test_invalid_display() {
        let err = SchemaError::invalid("unknown constraint kind 'Z'");
        assert_eq!(
            err.to_string(),
            "invalid schema object: unknown constraint kind 'Z'"
        );
    }
}
