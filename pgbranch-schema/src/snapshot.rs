//! JSON snapshot files.
//!
//! A snapshot is a [`Schema`] serialized as pretty-printed JSON. Snapshots let
//! the diff and merge commands work against a captured database state without
//! a live connection.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::model::Schema;

/// Serialize a schema to pretty JSON.
pub fn to_json(schema: &Schema) -> SchemaResult<String> {
    Ok(serde_json::to_string_pretty(schema)?)
}

/// Parse a schema from JSON.
pub fn from_json(json: &str) -> SchemaResult<Schema> {
    Ok(serde_json::from_str(json)?)
}

impl Schema {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> SchemaResult<String> {
        to_json(self)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        from_json(json)
    }
}

/// Write a snapshot to `path`.
pub fn save_snapshot(schema: &Schema, path: impl AsRef<Path>) -> SchemaResult<()> {
    let path = path.as_ref();
    let json = to_json(schema)?;
    fs::write(path, json).map_err(|e| SchemaError::io(path.display().to_string(), e))?;
    debug!(path = %path.display(), tables = schema.tables.len(), "Saved schema snapshot");
    Ok(())
}

/// Read a snapshot from `path`.
pub fn load_snapshot(path: impl AsRef<Path>) -> SchemaResult<Schema> {
    let path = path.as_ref();
    let json =
        fs::read_to_string(path).map_err(|e| SchemaError::io(path.display().to_string(), e))?;
    let schema = from_json(&json)?;
    debug!(path = %path.display(), tables = schema.tables.len(), "Loaded schema snapshot");
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, Constraint, ConstraintKind, Enum, Function, Index, Table};
    use pretty_assertions::assert_eq;

    fn sample() -> Schema {
        let users = Table::new("users")
            .in_schema("public")
            .with_column(Column::new("id", "integer").nullable(false))
            .with_column(Column::new("email", "character varying").char_max_length(255))
            .with_column(Column::new("tags", "text").array())
            .with_index(Index::new("users_pkey", "users", ["id"]).primary())
            .with_constraint(
                Constraint::new("users_pkey", ConstraintKind::PrimaryKey, "users", "PRIMARY KEY (id)")
                    .columns(["id"]),
            );

        Schema::new("app")
            .with_table(users)
            .with_enum(Enum::new("status", ["pending", "active"]))
            .with_function(Function::new(
                "noop",
                "",
                "void",
                "CREATE FUNCTION noop() RETURNS void LANGUAGE sql AS $$ $$",
            ))
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");

        let schema = sample();
        save_snapshot(&schema, &path).unwrap();
        let loaded = load_snapshot(&path).unwrap();

        assert_eq!(loaded, schema);
    }

    #[test]
    fn test_missing_file() {
        let err = load_snapshot("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = from_json("{ not json").unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let schema = Schema::from_json(r#"{ "name": "empty" }"#).unwrap();
        assert_eq!(schema.name, "empty");
        assert!(schema.is_empty());
    }
}
