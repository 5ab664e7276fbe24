//! Human-readable rendering of change sets.

use std::fmt::Write;

use indexmap::IndexMap;
use owo_colors::OwoColorize;
use pgbranch_migrate::{Change, ChangeSet, ChangeType, ColumnAlteration, DiffStat};

const DESTRUCTIVE: &str = "⚠ DESTRUCTIVE";

/// Marker coloring, off when writing to a pipe.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    /// Colors when stdout is a terminal.
    pub fn detect() -> Self {
        Self {
            color: crate::output::color_enabled(),
        }
    }

    /// No escape codes at all.
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn added(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    fn removed(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    fn changed(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }
}

/// The `Summary:` block.
pub fn stat_block(cs: &ChangeSet, palette: &Palette) -> String {
    let stat = DiffStat::from_change_set(cs);
    let mut out = String::from("Summary:\n");

    if stat.additions > 0 {
        let _ = writeln!(out, "  {} {} addition(s)", palette.added("+"), stat.additions);
    }
    if stat.deletions > 0 {
        let _ = writeln!(out, "  {} {} deletion(s)", palette.removed("-"), stat.deletions);
    }
    if stat.modifications > 0 {
        let _ = writeln!(
            out,
            "  {} {} modification(s)",
            palette.changed("~"),
            stat.modifications
        );
    }
    if stat.destructive > 0 {
        let _ = writeln!(
            out,
            "\n  {} {} destructive change(s)",
            palette.removed("⚠"),
            stat.destructive
        );
    }

    out
}

/// Full listing grouped by object kind, followed by the summary block.
pub fn full_listing(cs: &ChangeSet, palette: &Palette) -> String {
    let mut out = String::new();
    let destructive = palette.removed(DESTRUCTIVE);

    for change in cs.by_type(ChangeType::CreateTable) {
        if let Change::CreateTable { table } = change {
            let _ = writeln!(out, "{} TABLE {}", palette.added("+"), table.full_name());
            for column in table.sorted_columns() {
                let not_null = if column.is_nullable { "" } else { " NOT NULL" };
                let _ = writeln!(out, "    {} {}{}", column.name, column.full_type(), not_null);
            }
            out.push('\n');
        }
    }

    for change in cs.by_type(ChangeType::DropTable) {
        if let Change::DropTable { table } = change {
            let _ = writeln!(
                out,
                "{} TABLE {} {}\n",
                palette.removed("-"),
                table.full_name(),
                destructive
            );
        }
    }

    let mut by_table: IndexMap<String, Vec<String>> = IndexMap::new();
    for change in cs {
        let (table, line) = match change {
            Change::AddColumn { table, column } => (
                table,
                format!(
                    "  {} COLUMN {} {}",
                    palette.added("+"),
                    column.name,
                    column.full_type()
                ),
            ),
            Change::DropColumn { table, column } => (
                table,
                format!("  {} COLUMN {} {}", palette.removed("-"), column.name, destructive),
            ),
            Change::AlterColumn {
                table,
                column,
                alteration,
                ..
            } => {
                let flag = if change.is_destructive() {
                    format!(" {destructive}")
                } else {
                    String::new()
                };
                (
                    table,
                    format!(
                        "  {} COLUMN {}: {}{}",
                        palette.changed("~"),
                        column,
                        format_alteration(alteration),
                        flag
                    ),
                )
            }
            _ => continue,
        };
        by_table.entry(table.to_string()).or_default().push(line);
    }
    for (table, lines) in &by_table {
        let _ = writeln!(out, "{} TABLE {}", palette.changed("~"), table);
        for line in lines {
            let _ = writeln!(out, "{line}");
        }
        out.push('\n');
    }

    let index_creates = cs.by_type(ChangeType::CreateIndex);
    let index_drops = cs.by_type(ChangeType::DropIndex);
    if !index_creates.is_empty() || !index_drops.is_empty() {
        for change in index_creates {
            if let Change::CreateIndex { table, index } = change {
                let unique = if index.is_unique { "UNIQUE " } else { "" };
                let _ = writeln!(
                    out,
                    "{} {}INDEX {} on {}({})",
                    palette.added("+"),
                    unique,
                    index.name,
                    table,
                    index.columns.join(", ")
                );
            }
        }
        for change in index_drops {
            if let Change::DropIndex { index, .. } = change {
                let _ = writeln!(out, "{} INDEX {}", palette.removed("-"), index.name);
            }
        }
        out.push('\n');
    }

    let constraint_adds = cs.by_type(ChangeType::AddConstraint);
    let constraint_drops = cs.by_type(ChangeType::DropConstraint);
    if !constraint_adds.is_empty() || !constraint_drops.is_empty() {
        for change in constraint_adds {
            if let Change::AddConstraint { table, constraint } = change {
                let _ = writeln!(
                    out,
                    "{} CONSTRAINT {} ({}) on {}",
                    palette.added("+"),
                    constraint.name,
                    constraint.kind,
                    table
                );
            }
        }
        for change in constraint_drops {
            if let Change::DropConstraint { constraint, .. } = change {
                let flag = if change.is_destructive() {
                    format!(" {destructive}")
                } else {
                    String::new()
                };
                let _ = writeln!(
                    out,
                    "{} CONSTRAINT {} ({}){}",
                    palette.removed("-"),
                    constraint.name,
                    constraint.kind,
                    flag
                );
            }
        }
        out.push('\n');
    }

    let enum_creates = cs.by_type(ChangeType::CreateEnum);
    let enum_drops = cs.by_type(ChangeType::DropEnum);
    let enum_values = cs.by_type(ChangeType::AddEnumValue);
    if !enum_creates.is_empty() || !enum_drops.is_empty() || !enum_values.is_empty() {
        for change in enum_creates {
            if let Change::CreateEnum { definition } = change {
                let _ = writeln!(
                    out,
                    "{} ENUM {} ({})",
                    palette.added("+"),
                    definition.full_name(),
                    definition.values.join(", ")
                );
            }
        }
        for change in enum_drops {
            if let Change::DropEnum { definition } = change {
                let _ = writeln!(
                    out,
                    "{} ENUM {} {}",
                    palette.removed("-"),
                    definition.full_name(),
                    destructive
                );
            }
        }
        for change in enum_values {
            if let Change::AddEnumValue {
                enum_name, value, ..
            } = change
            {
                let _ = writeln!(
                    out,
                    "{} ENUM VALUE '{}' to {}",
                    palette.added("+"),
                    value,
                    enum_name
                );
            }
        }
        out.push('\n');
    }

    let function_creates = cs.by_type(ChangeType::CreateFunction);
    let function_drops = cs.by_type(ChangeType::DropFunction);
    let function_replaces = cs.by_type(ChangeType::ReplaceFunction);
    if !function_creates.is_empty() || !function_drops.is_empty() || !function_replaces.is_empty()
    {
        for change in function_creates {
            if let Change::CreateFunction { function } = change {
                let _ = writeln!(out, "{} FUNCTION {}", palette.added("+"), function.signature());
            }
        }
        for change in function_drops {
            if let Change::DropFunction { function } = change {
                let _ = writeln!(out, "{} FUNCTION {}", palette.removed("-"), function.signature());
            }
        }
        for change in function_replaces {
            if let Change::ReplaceFunction { new, .. } = change {
                let _ = writeln!(
                    out,
                    "{} FUNCTION {} [body changed]",
                    palette.changed("~"),
                    new.signature()
                );
            }
        }
        out.push('\n');
    }

    out.push_str(&stat_block(cs, palette));
    out
}

/// `type a → b, not null, default x` for an alteration.
pub fn format_alteration(alteration: &ColumnAlteration) -> String {
    let mut parts = Vec::new();

    if alteration.type_changed {
        parts.push(format!(
            "type {} → {}",
            alteration.old_type, alteration.new_type
        ));
    }
    if alteration.nullable_changed {
        parts.push(if alteration.new_nullable {
            "nullable".to_string()
        } else {
            "not null".to_string()
        });
    }
    if alteration.default_changed {
        parts.push(match &alteration.new_default {
            Some(default) => format!("default {default}"),
            None => "drop default".to_string(),
        });
    }

    parts.join(", ")
}
