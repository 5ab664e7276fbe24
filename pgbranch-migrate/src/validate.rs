//! Advisory pre-flight checks for a change set.
//!
//! Findings never block generation or application; callers decide whether
//! to proceed.

use serde::Serialize;

use crate::change::{Change, ChangeSet};

/// Types treated as numeric when judging conversions.
const NUMERIC_TYPES: &[&str] = &[
    "integer", "int", "bigint", "smallint", "decimal", "numeric", "real", "double",
];

/// Types treated as strings when judging conversions.
const STRING_TYPES: &[&str] = &["text", "varchar", "character varying", "char", "character"];

/// Findings from [`validate_changes`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// Changes that may behave unexpectedly or lose data.
    pub warnings: Vec<String>,
    /// Changes likely to fail against existing data.
    pub errors: Vec<String>,
}

impl Validation {
    /// Whether there are no findings at all.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    /// Whether any error-level finding exists.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Inspect a change set for risky changes.
pub fn validate_changes(cs: &ChangeSet) -> Validation {
    let mut validation = Validation::default();

    for change in cs {
        match change {
            Change::AlterColumn { alteration, .. } => {
                let object = change.object_name();

                if alteration.type_changed {
                    let old_type = alteration.old_type.as_str();
                    let new_type = alteration.new_type.as_str();

                    if is_numeric_type(old_type) && is_string_type(new_type) {
                        validation.warnings.push(format!(
                            "Changing {object} from {old_type} to {new_type} may lose precision"
                        ));
                    }
                    if is_string_type(old_type) && is_numeric_type(new_type) {
                        validation.errors.push(format!(
                            "Changing {object} from {old_type} to {new_type} may fail if data cannot be converted"
                        ));
                    }
                }

                if alteration.tightens_nullability() {
                    validation.warnings.push(format!(
                        "Setting {object} to NOT NULL may fail if column contains NULL values"
                    ));
                }
            }
            Change::DropColumn { .. } => validation.warnings.push(format!(
                "Dropping column {} will permanently delete all data in that column",
                change.object_name()
            )),
            Change::DropTable { .. } => validation.warnings.push(format!(
                "Dropping table {} will permanently delete all data in that table",
                change.object_name()
            )),
            _ => {}
        }
    }

    validation
}

/// Type name without a `(...)` modifier, e.g. `varchar(255)` → `varchar`.
fn base_type(full_type: &str) -> &str {
    match full_type.find('(') {
        Some(idx) => full_type[..idx].trim_end(),
        None => full_type,
    }
}

fn is_numeric_type(full_type: &str) -> bool {
    NUMERIC_TYPES.contains(&base_type(full_type))
}

fn is_string_type(full_type: &str) -> bool {
    STRING_TYPES.contains(&base_type(full_type))
}
