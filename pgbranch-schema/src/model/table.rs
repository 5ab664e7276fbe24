//! Base tables.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::column::Column;
use super::constraint::Constraint;
use super::index::Index;
use super::name::QualifiedName;

/// A base table with its columns, indexes and constraints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Owning schema.
    #[serde(default)]
    pub schema: String,
    /// Columns by name.
    #[serde(default)]
    pub columns: IndexMap<String, Column>,
    /// Indexes by name.
    #[serde(default)]
    pub indexes: IndexMap<String, Index>,
    /// Constraints by name.
    #[serde(default)]
    pub constraints: IndexMap<String, Constraint>,
}

impl Table {
    /// Create an empty table in the default schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the owning schema.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Add a column. Columns added without a position are numbered in
    /// insertion order.
    pub fn add_column(&mut self, mut column: Column) {
        if column.position == 0 {
            column.position = self.next_position();
        }
        self.columns.insert(column.name.clone(), column);
    }

    /// Add an index.
    pub fn add_index(&mut self, index: Index) {
        self.indexes.insert(index.name.clone(), index);
    }

    /// Add a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.insert(constraint.name.clone(), constraint);
    }

    /// Builder form of [`Table::add_column`].
    pub fn with_column(mut self, column: Column) -> Self {
        self.add_column(column);
        self
    }

    /// Builder form of [`Table::add_index`].
    pub fn with_index(mut self, index: Index) -> Self {
        self.add_index(index);
        self
    }

    /// Builder form of [`Table::add_constraint`].
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.add_constraint(constraint);
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

    /// Columns in declaration order.
    pub fn sorted_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.values().collect();
        columns.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
        columns
    }

    /// Indexes sorted by name.
    pub fn sorted_indexes(&self) -> Vec<&Index> {
        let mut indexes: Vec<&Index> = self.indexes.values().collect();
        indexes.sort_by(|a, b| a.name.cmp(&b.name));
        indexes
    }

    /// Constraints sorted by name.
    pub fn sorted_constraints(&self) -> Vec<&Constraint> {
        let mut constraints: Vec<&Constraint> = self.constraints.values().collect();
        constraints.sort_by(|a, b| a.name.cmp(&b.name));
        constraints
    }

    /// The primary key constraint, if any.
    pub fn primary_key(&self) -> Option<&Constraint> {
        self.constraints.values().find(|c| c.is_primary_key())
    }

    fn next_position(&self) -> i32 {
        self.columns
            .values()
            .map(|c| c.position)
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::constraint::ConstraintKind;

    #[test]
    fn test_positions_follow_insertion() {
        let table = Table::new("users")
            .with_column(Column::new("id", "integer"))
            .with_column(Column::new("email", "text"));

        assert_eq!(table.columns["id"].position, 1);
        assert_eq!(table.columns["email"].position, 2);
    }

    #[test]
    fn test_sorted_columns_by_position() {
        let table = Table::new("t")
            .with_column(Column::new("c", "text").position(3))
            .with_column(Column::new("a", "text").position(1))
            .with_column(Column::new("b", "text").position(2));

        let names: Vec<&str> = table.sorted_columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_sorted_constraints_by_name() {
        let table = Table::new("t")
            .with_constraint(Constraint::new("z_chk", ConstraintKind::Check, "t", "CHECK (true)"))
            .with_constraint(Constraint::new("a_pkey", ConstraintKind::PrimaryKey, "t", "PRIMARY KEY (id)"));

        let names: Vec<&str> = table
            .sorted_constraints()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["a_pkey", "z_chk"]);
        assert_eq!(table.primary_key().map(|c| c.name.as_str()), Some("a_pkey"));
    }

    #[test]
    fn test_full_name() {
        assert_eq!(Table::new("users").in_schema("public").full_name(), "users");
        assert_eq!(Table::new("users").in_schema("auth").full_name(), "auth.users");
    }
}
