//! `pgbranch diff` - show schema differences.

use indexmap::IndexMap;
use pgbranch_migrate::{
    ChangeSet, ChangeType, DiffStat, SqlGenerator, Validation, diff, order_changes,
    validate_changes,
};
use serde::Serialize;

use crate::cli::DiffArgs;
use crate::error::CliResult;
use crate::render::{self, Palette};
use crate::source::{Context, SchemaRef};

/// Machine-readable form of a diff.
#[derive(Debug, Serialize)]
pub struct DiffReport {
    /// Schema the changes start from.
    pub from: String,
    /// Schema the changes lead to.
    pub to: String,
    /// Addition/deletion/modification counts.
    pub stat: DiffStat,
    /// Count per change type, in phase order.
    pub summary: IndexMap<ChangeType, usize>,
    /// Change descriptions, in execution order.
    pub changes: Vec<String>,
    /// Validator findings.
    pub validation: Validation,
    /// Rendered statements without comments.
    pub sql: Vec<String>,
}

impl DiffReport {
    /// Build a report for an ordered change set. Fails if a change cannot
    /// be rendered.
    pub fn new(from: &SchemaRef, to: &SchemaRef, cs: &ChangeSet) -> CliResult<Self> {
        Ok(Self {
            from: from.to_string(),
            to: to.to_string(),
            stat: DiffStat::from_change_set(cs),
            summary: cs.summary(),
            changes: cs.iter().map(|c| c.description()).collect(),
            validation: validate_changes(cs),
            sql: SqlGenerator::new().with_comments(false).try_generate(cs)?,
        })
    }
}

/// Run the diff command
pub async fn run(ctx: &Context, args: DiffArgs) -> CliResult<()> {
    let from = SchemaRef::parse(&args.from);
    let to = SchemaRef::parse(&args.to);

    let from_schema = ctx.load_schema(&from).await?;
    let to_schema = ctx.load_schema(&to).await?;

    let changes = order_changes(diff(&from_schema, &to_schema));

    if args.json {
        let report = DiffReport::new(&from, &to, &changes)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if changes.is_empty() {
        println!("No schema differences between '{}' and '{}'", from, to);
        return Ok(());
    }

    println!("Comparing '{}' → '{}'\n", from, to);

    let palette = Palette::detect();
    if args.stat {
        print!("{}", render::stat_block(&changes, &palette));
    } else if args.sql {
        for statement in SqlGenerator::new().try_generate(&changes)? {
            println!("{statement}");
        }
    } else {
        print!("{}", render::full_listing(&changes, &palette));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgbranch_migrate::{Change, ColumnAlteration};
    use pgbranch_schema::{Column, QualifiedName};

    #[test]
    fn test_report_rejects_unrenderable_change() {
        let column = Column::new("age", "integer");
        let changes: ChangeSet = vec![Change::AlterColumn {
            table: QualifiedName::new("users"),
            column: "age".into(),
            alteration: ColumnAlteration::between(&column, &column),
            old: column.clone(),
            new: column,
        }]
        .into_iter()
        .collect();

        let from = SchemaRef::parse("main.json");
        let to = SchemaRef::parse("feature.json");
        assert!(DiffReport::new(&from, &to, &changes).is_err());
    }
}
