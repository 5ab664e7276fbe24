//! Structural schema diffing.
//!
//! Every category is a three-way partition by key: present only in `from`
//! is dropped, present only in `to` is created, present in both is compared.
//! Keys are walked in sorted order so the same pair of schemas always yields
//! the same change sequence.

use pgbranch_schema::{Enum, Schema, Table};
use tracing::debug;

use crate::change::{Change, ChangeSet, ChangeSetBuilder, ColumnAlteration};

/// Compute the changes that turn `from` into `to`.
pub fn diff(from: &Schema, to: &Schema) -> ChangeSet {
    SchemaDiffer::new(from, to).diff()
}

/// Schema differ for comparing two snapshots.
pub struct SchemaDiffer<'a> {
    /// Current state.
    from: &'a Schema,
    /// Desired state.
    to: &'a Schema,
}

impl<'a> SchemaDiffer<'a> {
    /// Create a differ from `from` towards `to`.
    pub fn new(from: &'a Schema, to: &'a Schema) -> Self {
        Self { from, to }
    }

    /// Compute the change set. Never fails.
    pub fn diff(&self) -> ChangeSet {
        let mut changes = ChangeSet::builder();

        self.diff_enums(&mut changes);
        self.diff_tables(&mut changes);
        self.diff_functions(&mut changes);

        debug!(
            from = %self.from.name,
            to = %self.to.name,
            changes = changes.len(),
            "Computed schema diff"
        );

        changes.build()
    }

    fn diff_enums(&self, changes: &mut ChangeSetBuilder) {
        for from_enum in self.from.sorted_enums() {
            if !self.to.enums.contains_key(&from_enum.name) {
                changes.push(Change::DropEnum {
                    definition: from_enum.clone(),
                });
            }
        }

        for to_enum in self.to.sorted_enums() {
            match self.from.enums.get(&to_enum.name) {
                None => {
                    changes.push(Change::CreateEnum {
                        definition: to_enum.clone(),
                    });
                }
                Some(from_enum) => diff_enum_values(from_enum, to_enum, changes),
            }
        }
    }

    fn diff_tables(&self, changes: &mut ChangeSetBuilder) {
        for from_table in self.from.sorted_tables() {
            if !self.to.tables.contains_key(&from_table.name) {
                changes.push(Change::DropTable {
                    table: from_table.clone(),
                });
            }
        }

        for to_table in self.to.sorted_tables() {
            match self.from.tables.get(&to_table.name) {
                None => {
                    changes.push(Change::CreateTable {
                        table: to_table.clone(),
                    });
                }
                Some(from_table) => {
                    diff_columns(from_table, to_table, changes);
                    diff_indexes(from_table, to_table, changes);
                    diff_constraints(from_table, to_table, changes);
                }
            }
        }
    }

    fn diff_functions(&self, changes: &mut ChangeSetBuilder) {
        for from_fn in self.from.sorted_functions() {
            if !self.to.functions.contains_key(&from_fn.signature()) {
                changes.push(Change::DropFunction {
                    function: from_fn.clone(),
                });
            }
        }

        for to_fn in self.to.sorted_functions() {
            match self.from.functions.get(&to_fn.signature()) {
                None => {
                    changes.push(Change::CreateFunction {
                        function: to_fn.clone(),
                    });
                }
                Some(from_fn) if !from_fn.same_definition(to_fn) => {
                    changes.push(Change::ReplaceFunction {
                        old: from_fn.clone(),
                        new: to_fn.clone(),
                    });
                }
                Some(_) => {}
            }
        }
    }
}

/// Only additions are modeled; labels are never dropped or reordered.
fn diff_enum_values(from: &Enum, to: &Enum, changes: &mut ChangeSetBuilder) {
    for (i, value) in to.values.iter().enumerate() {
        if from.contains(value) {
            continue;
        }
        let after = if i > 0 {
            Some(to.values[i - 1].clone())
        } else {
            None
        };
        changes.push(Change::AddEnumValue {
            enum_name: to.qualified_name(),
            value: value.clone(),
            after,
        });
    }
}

fn diff_columns(from: &Table, to: &Table, changes: &mut ChangeSetBuilder) {
    let table = to.qualified_name();

    for from_col in from.sorted_columns() {
        if !to.columns.contains_key(&from_col.name) {
            changes.push(Change::DropColumn {
                table: table.clone(),
                column: from_col.clone(),
            });
        }
    }

    for to_col in to.sorted_columns() {
        match from.columns.get(&to_col.name) {
            None => {
                changes.push(Change::AddColumn {
                    table: table.clone(),
                    column: to_col.clone(),
                });
            }
            Some(from_col) if !from_col.same_definition(to_col) => {
                changes.push(Change::AlterColumn {
                    table: table.clone(),
                    column: to_col.name.clone(),
                    old: from_col.clone(),
                    new: to_col.clone(),
                    alteration: ColumnAlteration::between(from_col, to_col),
                });
            }
            Some(_) => {}
        }
    }
}

/// Primary key indexes are managed through their constraint.
fn diff_indexes(from: &Table, to: &Table, changes: &mut ChangeSetBuilder) {
    let table = to.qualified_name();

    for from_idx in from.sorted_indexes() {
        if from_idx.is_primary {
            continue;
        }
        if !to.indexes.contains_key(&from_idx.name) {
            changes.push(Change::DropIndex {
                table: table.clone(),
                index: from_idx.clone(),
            });
        }
    }

    for to_idx in to.sorted_indexes() {
        if to_idx.is_primary {
            continue;
        }
        match from.indexes.get(&to_idx.name) {
            None => {
                changes.push(Change::CreateIndex {
                    table: table.clone(),
                    index: to_idx.clone(),
                });
            }
            Some(from_idx) if !from_idx.same_definition(to_idx) => {
                changes.push(Change::DropIndex {
                    table: table.clone(),
                    index: from_idx.clone(),
                });
                changes.push(Change::CreateIndex {
                    table: table.clone(),
                    index: to_idx.clone(),
                });
            }
            Some(_) => {}
        }
    }
}

fn diff_constraints(from: &Table, to: &Table, changes: &mut ChangeSetBuilder) {
    let table = to.qualified_name();

    for from_con in from.sorted_constraints() {
        if !to.constraints.contains_key(&from_con.name) {
            changes.push(Change::DropConstraint {
                table: table.clone(),
                constraint: from_con.clone(),
            });
        }
    }

    for to_con in to.sorted_constraints() {
        match from.constraints.get(&to_con.name) {
            None => {
                changes.push(Change::AddConstraint {
                    table: table.clone(),
                    constraint: to_con.clone(),
                });
            }
            Some(from_con) if !from_con.same_definition(to_con) => {
                changes.push(Change::DropConstraint {
                    table: table.clone(),
                    constraint: from_con.clone(),
                });
                changes.push(Change::AddConstraint {
                    table: table.clone(),
                    constraint: to_con.clone(),
                });
            }
            Some(_) => {}
        }
    }
}
