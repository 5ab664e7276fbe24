//! Enumerated types.

use serde::{Deserialize, Serialize};

use super::name::QualifiedName;

/// A user-defined enum type. Label order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Enum {
    /// Type name.
    pub name: String,
    /// Owning schema.
    #[serde(default)]
    pub schema: String,
    /// Labels in their defined sort order.
    pub values: Vec<String>,
}

impl Enum {
    /// Create an enum in the default schema.
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            schema: String::new(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the owning schema.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// The schema-qualified name.
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::qualified(self.schema.clone(), self.name.clone())
    }

    /// Display name, bare for the default schema.
    pub fn full_name(&self) -> String {
        self.qualified_name().to_string()
    }

    /// Whether `value` is one of the labels.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}
