//! Dependency-safe ordering of a change set.

use crate::change::{ChangeSet, ChangeType};

/// Execution phases, earliest first.
///
/// Creations run before anything that may depend on them. Drops run last,
/// constraints before the columns, tables and types they reference.
pub const PHASES: [ChangeType; 15] = [
    ChangeType::CreateEnum,
    ChangeType::AddEnumValue,
    ChangeType::CreateTable,
    ChangeType::AddColumn,
    ChangeType::CreateIndex,
    ChangeType::AddConstraint,
    ChangeType::CreateFunction,
    ChangeType::ReplaceFunction,
    ChangeType::DropConstraint,
    ChangeType::DropIndex,
    ChangeType::AlterColumn,
    ChangeType::DropColumn,
    ChangeType::DropTable,
    ChangeType::DropEnum,
    ChangeType::DropFunction,
];

impl ChangeType {
    /// Position of this change type in [`PHASES`].
    pub fn phase(&self) -> usize {
        PHASES
            .iter()
            .position(|t| t == self)
            .unwrap_or(PHASES.len())
    }
}

/// Reorder changes into phase order. Relative order within a phase is kept.
pub fn order_changes(cs: ChangeSet) -> ChangeSet {
    let mut changes: Vec<_> = cs.into_iter().collect();
    // sort_by_key is stable
    changes.sort_by_key(|c| c.change_type().phase());
    changes.into_iter().collect()
}
