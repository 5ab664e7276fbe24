//! Table constraints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// The kind of a table constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// `PRIMARY KEY`
    #[serde(rename = "PRIMARY KEY")]
    PrimaryKey,
    /// `FOREIGN KEY`
    #[serde(rename = "FOREIGN KEY")]
    ForeignKey,
    /// `UNIQUE`
    #[serde(rename = "UNIQUE")]
    Unique,
    /// `CHECK`
    #[serde(rename = "CHECK")]
    Check,
    /// `EXCLUDE`
    #[serde(rename = "EXCLUDE")]
    Exclusion,
}

impl ConstraintKind {
    /// The SQL keyword form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryKey => "PRIMARY KEY",
            Self::ForeignKey => "FOREIGN KEY",
            Self::Unique => "UNIQUE",
            Self::Check => "CHECK",
            Self::Exclusion => "EXCLUDE",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstraintKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRIMARY KEY" | "P" => Ok(Self::PrimaryKey),
            "FOREIGN KEY" | "F" => Ok(Self::ForeignKey),
            "UNIQUE" | "U" => Ok(Self::Unique),
            "CHECK" | "C" => Ok(Self::Check),
            "EXCLUDE" | "X" => Ok(Self::Exclusion),
            other => Err(SchemaError::invalid(format!(
                "unknown constraint kind '{other}'"
            ))),
        }
    }
}

/// A constraint on a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint name.
    pub name: String,
    /// Constraint kind.
    pub kind: ConstraintKind,
    /// Owning table name.
    pub table_name: String,
    /// Constrained columns.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Definition as rendered by `pg_get_constraintdef`.
    pub definition: String,
    /// Referenced table (foreign keys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_table: Option<String>,
    /// Referenced columns (foreign keys).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ref_columns: Vec<String>,
    /// `ON DELETE` action (foreign keys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
    /// `ON UPDATE` action (foreign keys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
}

impl Constraint {
    /// Create a constraint from its rendered definition.
    pub fn new(
        name: impl Into<String>,
        kind: ConstraintKind,
        table_name: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            table_name: table_name.into(),
            columns: Vec::new(),
            definition: definition.into(),
            ref_table: None,
            ref_columns: Vec::new(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Set the constrained columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the foreign key target.
    pub fn references(
        mut self,
        table: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.ref_table = Some(table.into());
        self.ref_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this is a primary key.
    pub fn is_primary_key(&self) -> bool {
        self.kind == ConstraintKind::PrimaryKey
    }

    /// Whether this is a foreign key.
    pub fn is_foreign_key(&self) -> bool {
        self.kind == ConstraintKind::ForeignKey
    }

    /// Equality by name, kind and definition text.
    pub fn same_definition(&self, other: &Constraint) -> bool {
        self.name == other.name && self.kind == other.kind && self.definition == other.definition
    }
}
