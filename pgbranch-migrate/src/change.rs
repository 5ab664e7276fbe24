//! Typed schema changes and the change set that carries them.

use std::fmt;

use indexmap::IndexMap;
use pgbranch_schema::{Column, Constraint, Enum, Function, Index, QualifiedName, Table};
use serde::Serialize;

use crate::order::PHASES;

/// The kind of a [`Change`], with a stable tag string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    /// `CREATE TABLE`
    CreateTable,
    /// `DROP TABLE`
    DropTable,
    /// `ADD COLUMN`
    AddColumn,
    /// `DROP COLUMN`
    DropColumn,
    /// `ALTER COLUMN` (type, nullability, default)
    AlterColumn,
    /// `CREATE INDEX`
    CreateIndex,
    /// `DROP INDEX`
    DropIndex,
    /// `ADD CONSTRAINT`
    AddConstraint,
    /// `DROP CONSTRAINT`
    DropConstraint,
    /// `CREATE TYPE ... AS ENUM`
    CreateEnum,
    /// `DROP TYPE`
    DropEnum,
    /// `ALTER TYPE ... ADD VALUE`
    AddEnumValue,
    /// `CREATE FUNCTION`
    CreateFunction,
    /// `DROP FUNCTION`
    DropFunction,
    /// `CREATE OR REPLACE FUNCTION`
    ReplaceFunction,
}

impl ChangeType {
    /// The stable tag, e.g. `CREATE_TABLE`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTable => "CREATE_TABLE",
            Self::DropTable => "DROP_TABLE",
            Self::AddColumn => "ADD_COLUMN",
            Self::DropColumn => "DROP_COLUMN",
            Self::AlterColumn => "ALTER_COLUMN",
            Self::CreateIndex => "CREATE_INDEX",
            Self::DropIndex => "DROP_INDEX",
            Self::AddConstraint => "ADD_CONSTRAINT",
            Self::DropConstraint => "DROP_CONSTRAINT",
            Self::CreateEnum => "CREATE_ENUM",
            Self::DropEnum => "DROP_ENUM",
            Self::AddEnumValue => "ADD_ENUM_VALUE",
            Self::CreateFunction => "CREATE_FUNCTION",
            Self::DropFunction => "DROP_FUNCTION",
            Self::ReplaceFunction => "REPLACE_FUNCTION",
        }
    }

    /// Which `--stat` bucket this kind of change counts towards.
    pub fn bucket(&self) -> ChangeBucket {
        match self {
            Self::CreateTable
            | Self::AddColumn
            | Self::CreateIndex
            | Self::AddConstraint
            | Self::CreateEnum
            | Self::AddEnumValue
            | Self::CreateFunction => ChangeBucket::Addition,
            Self::DropTable
            | Self::DropColumn
            | Self::DropIndex
            | Self::DropConstraint
            | Self::DropEnum
            | Self::DropFunction => ChangeBucket::Deletion,
            Self::AlterColumn | Self::ReplaceFunction => ChangeBucket::Modification,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification used by diff statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeBucket {
    /// Something new is created.
    Addition,
    /// Something is dropped.
    Deletion,
    /// Something existing is altered or replaced.
    Modification,
}

/// What an [`Change::AlterColumn`] changes. Each attribute is tracked
/// independently so several edits fold into one change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnAlteration {
    /// Whether the canonical full type differs.
    pub type_changed: bool,
    /// Full type before.
    pub old_type: String,
    /// Full type after.
    pub new_type: String,
    /// Whether nullability differs.
    pub nullable_changed: bool,
    /// Nullability before.
    pub old_nullable: bool,
    /// Nullability after.
    pub new_nullable: bool,
    /// Whether the default expression differs.
    pub default_changed: bool,
    /// Default before.
    pub old_default: Option<String>,
    /// Default after.
    pub new_default: Option<String>,
}

impl ColumnAlteration {
    /// Compare two versions of a column.
    pub fn between(old: &Column, new: &Column) -> Self {
        let old_type = old.full_type();
        let new_type = new.full_type();
        Self {
            type_changed: old_type != new_type,
            old_type,
            new_type,
            nullable_changed: old.is_nullable != new.is_nullable,
            old_nullable: old.is_nullable,
            new_nullable: new.is_nullable,
            default_changed: old.default != new.default,
            old_default: old.default.clone(),
            new_default: new.default.clone(),
        }
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        !self.type_changed && !self.nullable_changed && !self.default_changed
    }

    /// Whether the column goes from nullable to `NOT NULL`.
    pub fn tightens_nullability(&self) -> bool {
        self.nullable_changed && !self.new_nullable
    }
}

/// A single schema change.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Create a table with its constraints and indexes.
    CreateTable {
        /// The table to create.
        table: Table,
    },
    /// Drop a table.
    DropTable {
        /// The table as it existed.
        table: Table,
    },
    /// Add a column to an existing table.
    AddColumn {
        /// Owning table.
        table: QualifiedName,
        /// The new column.
        column: Column,
    },
    /// Drop a column.
    DropColumn {
        /// Owning table.
        table: QualifiedName,
        /// The column as it existed.
        column: Column,
    },
    /// Change a column's type, nullability or default.
    AlterColumn {
        /// Owning table.
        table: QualifiedName,
        /// Column name.
        column: String,
        /// Column before.
        old: Column,
        /// Column after.
        new: Column,
        /// Which attributes changed.
        alteration: ColumnAlteration,
    },
    /// Create an index on an existing table.
    CreateIndex {
        /// Indexed table.
        table: QualifiedName,
        /// The new index.
        index: Index,
    },
    /// Drop an index.
    DropIndex {
        /// Indexed table.
        table: QualifiedName,
        /// The index as it existed.
        index: Index,
    },
    /// Add a constraint to an existing table.
    AddConstraint {
        /// Constrained table.
        table: QualifiedName,
        /// The new constraint.
        constraint: Constraint,
    },
    /// Drop a constraint.
    DropConstraint {
        /// Constrained table.
        table: QualifiedName,
        /// The constraint as it existed.
        constraint: Constraint,
    },
    /// Create an enum type.
    CreateEnum {
        /// The enum to create.
        definition: Enum,
    },
    /// Drop an enum type.
    DropEnum {
        /// The enum as it existed.
        definition: Enum,
    },
    /// Add one label to an existing enum.
    AddEnumValue {
        /// The enum being extended.
        enum_name: QualifiedName,
        /// The new label.
        value: String,
        /// Label the new value goes after; `None` lets the database append it.
        after: Option<String>,
    },
    /// Create a function.
    CreateFunction {
        /// The function to create.
        function: Function,
    },
    /// Drop a function.
    DropFunction {
        /// The function as it existed.
        function: Function,
    },
    /// Replace a function body in place.
    ReplaceFunction {
        /// Definition before.
        old: Function,
        /// Definition after.
        new: Function,
    },
}

impl Change {
    /// The kind of this change.
    pub fn change_type(&self) -> ChangeType {
        match self {
            Self::CreateTable { .. } => ChangeType::CreateTable,
            Self::DropTable { .. } => ChangeType::DropTable,
            Self::AddColumn { .. } => ChangeType::AddColumn,
            Self::DropColumn { .. } => ChangeType::DropColumn,
            Self::AlterColumn { .. } => ChangeType::AlterColumn,
            Self::CreateIndex { .. } => ChangeType::CreateIndex,
            Self::DropIndex { .. } => ChangeType::DropIndex,
            Self::AddConstraint { .. } => ChangeType::AddConstraint,
            Self::DropConstraint { .. } => ChangeType::DropConstraint,
            Self::CreateEnum { .. } => ChangeType::CreateEnum,
            Self::DropEnum { .. } => ChangeType::DropEnum,
            Self::AddEnumValue { .. } => ChangeType::AddEnumValue,
            Self::CreateFunction { .. } => ChangeType::CreateFunction,
            Self::DropFunction { .. } => ChangeType::DropFunction,
            Self::ReplaceFunction { .. } => ChangeType::ReplaceFunction,
        }
    }

    /// Whether applying this change can discard data or drop a guarantee
    /// that cannot be rebuilt from the schema alone.
    pub fn is_destructive(&self) -> bool {
        match self {
            Self::DropTable { .. } | Self::DropColumn { .. } | Self::DropEnum { .. } => true,
            Self::AlterColumn { alteration, .. } => {
                alteration.type_changed || alteration.tightens_nullability()
            }
            Self::DropConstraint { constraint, .. } => constraint.is_foreign_key(),
            _ => false,
        }
    }

    /// Name of the object this change touches.
    pub fn object_name(&self) -> String {
        match self {
            Self::CreateTable { table } | Self::DropTable { table } => table.full_name(),
            Self::AddColumn { table, column } | Self::DropColumn { table, column } => {
                format!("{}.{}", table, column.name)
            }
            Self::AlterColumn { table, column, .. } => format!("{table}.{column}"),
            Self::CreateIndex { index, .. } | Self::DropIndex { index, .. } => index.name.clone(),
            Self::AddConstraint { constraint, .. } | Self::DropConstraint { constraint, .. } => {
                constraint.name.clone()
            }
            Self::CreateEnum { definition } | Self::DropEnum { definition } => {
                definition.full_name()
            }
            Self::AddEnumValue { enum_name, .. } => enum_name.to_string(),
            Self::CreateFunction { function } | Self::DropFunction { function } => {
                function.full_name()
            }
            Self::ReplaceFunction { new, .. } => new.full_name(),
        }
    }

    /// Human-readable one-line description.
    pub fn description(&self) -> String {
        match self {
            Self::CreateTable { table } => format!("Create table {}", table.full_name()),
            Self::DropTable { table } => format!("Drop table {}", table.full_name()),
            Self::AddColumn { table, column } => {
                format!("Add column {}.{} ({})", table, column.name, column.full_type())
            }
            Self::DropColumn { table, column } => {
                format!("Drop column {}.{}", table, column.name)
            }
            Self::AlterColumn {
                table,
                column,
                alteration,
                ..
            } => format!(
                "Alter column {}.{}: {}",
                table,
                column,
                describe_alteration(alteration)
            ),
            Self::CreateIndex { table, index } => {
                let unique = if index.is_unique { "unique " } else { "" };
                format!("Create {}index {} on {}", unique, index.name, table)
            }
            Self::DropIndex { index, .. } => format!("Drop index {}", index.name),
            Self::AddConstraint { table, constraint } => format!(
                "Add {} constraint {} on {}",
                constraint.kind, constraint.name, table
            ),
            Self::DropConstraint { table, constraint } => format!(
                "Drop {} constraint {} from {}",
                constraint.kind, constraint.name, table
            ),
            Self::CreateEnum { definition } => format!("Create enum {}", definition.full_name()),
            Self::DropEnum { definition } => format!("Drop enum {}", definition.full_name()),
            Self::AddEnumValue {
                enum_name,
                value,
                after,
            } => match after {
                Some(after) => format!("Add value '{value}' to enum {enum_name} after '{after}'"),
                None => format!("Add value '{value}' to enum {enum_name}"),
            },
            Self::CreateFunction { function } => {
                format!("Create function {}", function.signature())
            }
            Self::DropFunction { function } => format!("Drop function {}", function.signature()),
            Self::ReplaceFunction { new, .. } => format!("Replace function {}", new.signature()),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

fn describe_alteration(alteration: &ColumnAlteration) -> String {
    let mut parts = Vec::new();

    if alteration.type_changed {
        parts.push(format!(
            "type {} → {}",
            alteration.old_type, alteration.new_type
        ));
    }
    if alteration.nullable_changed {
        parts.push(if alteration.new_nullable {
            "set nullable".to_string()
        } else {
            "set not null".to_string()
        });
    }
    if alteration.default_changed {
        parts.push(match &alteration.new_default {
            Some(default) => format!("set default {default}"),
            None => "drop default".to_string(),
        });
    }

    parts.join(", ")
}

/// Accumulates changes before freezing them into a [`ChangeSet`].
#[derive(Debug, Default)]
pub struct ChangeSetBuilder {
    changes: Vec<Change>,
}

impl ChangeSetBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a change.
    pub fn push(&mut self, change: Change) -> &mut Self {
        self.changes.push(change);
        self
    }

    /// Number of changes collected so far.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Freeze into a change set.
    pub fn build(self) -> ChangeSet {
        ChangeSet {
            changes: self.changes,
        }
    }
}

impl Extend<Change> for ChangeSetBuilder {
    fn extend<I: IntoIterator<Item = Change>>(&mut self, iter: I) {
        self.changes.extend(iter);
    }
}

/// A sequence of changes. Order carries meaning only once the set has been
/// through [`crate::order_changes`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// An empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a change set.
    pub fn builder() -> ChangeSetBuilder {
        ChangeSetBuilder::new()
    }

    /// Whether there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Iterate over the changes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// The changes as a slice.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Whether any change is destructive.
    pub fn has_destructive(&self) -> bool {
        self.changes.iter().any(Change::is_destructive)
    }

    /// Number of destructive changes.
    pub fn destructive_count(&self) -> usize {
        self.changes.iter().filter(|c| c.is_destructive()).count()
    }

    /// Changes of one kind, in order.
    pub fn by_type(&self, change_type: ChangeType) -> Vec<&Change> {
        self.changes
            .iter()
            .filter(|c| c.change_type() == change_type)
            .collect()
    }

    /// Count per change type, in execution phase order. Types with no
    /// changes are omitted.
    pub fn summary(&self) -> IndexMap<ChangeType, usize> {
        let mut summary = IndexMap::new();
        for change_type in PHASES {
            let count = self
                .changes
                .iter()
                .filter(|c| c.change_type() == change_type)
                .count();
            if count > 0 {
                summary.insert(change_type, count);
            }
        }
        summary
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgbranch_schema::ConstraintKind;
    use pretty_assertions::assert_eq;

    fn users() -> QualifiedName {
        QualifiedName::new("users")
    }

    fn alter(old: Column, new: Column) -> Change {
        let alteration = ColumnAlteration::between(&old, &new);
        Change::AlterColumn {
            table: users(),
            column: old.name.clone(),
            old,
            new,
            alteration,
        }
    }

    #[test]
    fn test_destructive_classification() {
        let table = Table::new("users");
        let column = Column::new("email", "text");
        let fk = Constraint::new(
            "orders_user_fk",
            ConstraintKind::ForeignKey,
            "orders",
            "FOREIGN KEY (user_id) REFERENCES users(id)",
        );
        let check = Constraint::new("chk", ConstraintKind::Check, "users", "CHECK (true)");
        let function = Function::new("f", "", "void", "CREATE FUNCTION f()");

        assert!(Change::DropTable { table: table.clone() }.is_destructive());
        assert!(Change::DropColumn { table: users(), column: column.clone() }.is_destructive());
        assert!(Change::DropEnum { definition: Enum::new("s", ["a"]) }.is_destructive());
        assert!(
            !Change::DropIndex { table: users(), index: Index::new("idx", "users", ["email"]) }
                .is_destructive()
        );
        assert!(!Change::DropFunction { function: function.clone() }.is_destructive());
        assert!(Change::DropConstraint { table: users(), constraint: fk }.is_destructive());
        assert!(!Change::DropConstraint { table: users(), constraint: check }.is_destructive());

        assert!(!Change::CreateTable { table }.is_destructive());
        assert!(!Change::AddColumn { table: users(), column }.is_destructive());
        assert!(!Change::CreateFunction { function }.is_destructive());
    }

    #[test]
    fn test_alter_column_destructive_only_when_tightening() {
        let relax = alter(
            Column::new("a", "text").nullable(false),
            Column::new("a", "text").nullable(true),
        );
        assert!(!relax.is_destructive());

        let tighten = alter(
            Column::new("a", "text").nullable(true),
            Column::new("a", "text").nullable(false),
        );
        assert!(tighten.is_destructive());

        let retype = alter(Column::new("a", "integer"), Column::new("a", "bigint"));
        assert!(retype.is_destructive());

        let default_only = alter(Column::new("a", "text"), Column::new("a", "text").default_value("'x'"));
        assert!(!default_only.is_destructive());
    }

    #[test]
    fn test_alter_description() {
        let change = alter(
            Column::new("age", "integer"),
            Column::new("age", "bigint").nullable(false).default_value("0"),
        );
        assert_eq!(
            change.description(),
            "Alter column users.age: type integer → bigint, set not null, set default 0"
        );
    }

    #[test]
    fn test_enum_value_description() {
        let change = Change::AddEnumValue {
            enum_name: QualifiedName::new("status"),
            value: "deleted".into(),
            after: Some("active".into()),
        };
        assert_eq!(
            change.description(),
            "Add value 'deleted' to enum status after 'active'"
        );
        assert_eq!(change.object_name(), "status");
    }

    #[test]
    fn test_object_names() {
        let change = Change::AddColumn {
            table: QualifiedName::qualified("billing", "invoices"),
            column: Column::new("total", "numeric"),
        };
        assert_eq!(change.object_name(), "billing.invoices.total");
        assert_eq!(change.change_type(), ChangeType::AddColumn);
        assert_eq!(change.change_type().to_string(), "ADD_COLUMN");
    }

    #[test]
    fn test_change_set_queries() {
        let mut builder = ChangeSet::builder();
        builder
            .push(Change::CreateTable { table: Table::new("a") })
            .push(Change::DropTable { table: Table::new("b") })
            .push(Change::DropTable { table: Table::new("c") })
            .push(Change::CreateEnum { definition: Enum::new("s", ["x"]) });
        let cs = builder.build();

        assert_eq!(cs.len(), 4);
        assert!(cs.has_destructive());
        assert_eq!(cs.destructive_count(), 2);
        assert_eq!(cs.by_type(ChangeType::DropTable).len(), 2);

        let summary: Vec<(ChangeType, usize)> = cs.summary().into_iter().collect();
        assert_eq!(
            summary,
            vec![
                (ChangeType::CreateEnum, 1),
                (ChangeType::CreateTable, 1),
                (ChangeType::DropTable, 2),
            ]
        );
    }

    #[test]
    fn test_buckets() {
        assert_eq!(ChangeType::AddEnumValue.bucket(), ChangeBucket::Addition);
        assert_eq!(ChangeType::DropIndex.bucket(), ChangeBucket::Deletion);
        assert_eq!(ChangeType::ReplaceFunction.bucket(), ChangeBucket::Modification);
    }
}
