//! Schema-qualified object names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The schema PostgreSQL resolves unqualified names against.
pub const DEFAULT_SCHEMA: &str = "public";

/// A possibly schema-qualified object name.
///
/// Objects living in `public` (or with no schema recorded) display as the bare
/// name, everything else as `schema.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Owning schema, if any.
    pub schema: Option<String>,
    /// Object name.
    pub name: String,
}

impl QualifiedName {
    /// Create an unqualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// Create a name qualified by `schema`.
    ///
    /// An empty schema or `public` is normalized away.
    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        let schema = schema.into();
        Self {
            schema: if is_default_schema(&schema) {
                None
            } else {
                Some(schema)
            },
            name: name.into(),
        }
    }

    /// The non-default schema, if one is set.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref().filter(|s| !is_default_schema(s))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.schema() {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for QualifiedName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Whether `schema` is the implicit default schema.
pub fn is_default_schema(schema: &str) -> bool {
    schema.is_empty() || schema == DEFAULT_SCHEMA
}
