//! `pgbranch merge` - apply schema changes from one database to another.

use std::time::Duration;

use owo_colors::OwoColorize;
use pgbranch_migrate::{
    Applier, ApplierConfig, ChangeSet, MigrationError, MigrationFileWriter, SqlGenerator, diff,
    order_changes, validate_changes,
};
use pgbranch_postgres::PgPool;

use crate::cli::MergeArgs;
use crate::error::{CliError, CliResult};
use crate::output;
use crate::render::{self, Palette};
use crate::source::{Context, SchemaRef};

/// Run the merge command
pub async fn run(ctx: &Context, args: MergeArgs) -> CliResult<()> {
    let source = SchemaRef::parse(&args.source);
    let target = SchemaRef::parse(&args.target);

    if !target.is_database() && !args.dry_run && !args.migration_file {
        return Err(CliError::Command(format!(
            "cannot apply changes to snapshot file '{}'; use --dry-run or --migration-file",
            target
        )));
    }

    println!("Extracting schema from '{}'...", source);
    let source_schema = ctx.load_schema(&source).await?;
    println!("Extracting schema from '{}'...", target);
    let target_schema = ctx.load_schema(&target).await?;

    let changes = diff(&target_schema, &source_schema);
    if changes.is_empty() {
        println!("\nNo schema differences between '{}' and '{}'", source, target);
        return Ok(());
    }
    let changes = order_changes(changes);

    println!("\nChanges to merge from '{}' → '{}':\n", source, target);
    print!("{}", render::full_listing(&changes, &Palette::detect()));

    print_validation(&changes);

    if args.dry_run {
        let statements = dry_run_statements(&changes)?;
        println!("\n--- Dry Run: SQL that would be executed ---\n");
        for statement in statements {
            println!("{statement}");
        }
        return Ok(());
    }

    if args.migration_file {
        let dir = args
            .migration_dir
            .clone()
            .unwrap_or_else(|| ctx.config.migrations.directory.clone());
        let writer = MigrationFileWriter::new(dir)
            .include_comments(ctx.config.migrations.include_comments);
        let path = writer
            .write(&changes, &file_label(&source), &file_label(&target))
            .await?;
        output::newline();
        output::success(&format!("Migration file created: {}", path.display()));
        return Ok(());
    }

    if !args.force && !confirmed(&changes, &target) {
        println!("Merge cancelled.");
        return Ok(());
    }

    apply(ctx, &args, &source, &target, &changes).await
}

/// Label for migration file names; snapshot paths reduce to their file stem.
fn file_label(reference: &SchemaRef) -> String {
    match reference {
        SchemaRef::Snapshot(path) => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| reference.to_string()),
        other => other.to_string(),
    }
}

fn print_validation(changes: &ChangeSet) {
    let validation = validate_changes(changes);

    if !validation.warnings.is_empty() {
        println!("\n{} Warnings:", "⚠".yellow());
        for warning in &validation.warnings {
            output::list_item(warning);
        }
    }

    if !validation.errors.is_empty() {
        println!("\n{} Potential Issues:", "✗".red());
        for error in &validation.errors {
            output::list_item(error);
        }
    }
}

fn confirmed(changes: &ChangeSet, target: &SchemaRef) -> bool {
    if changes.has_destructive() {
        println!(
            "\n{} This merge contains {} destructive change(s) that may result in data loss.",
            "⚠ WARNING:".red(),
            changes.destructive_count()
        );
        output::confirm("Do you want to proceed?")
    } else {
        output::confirm(&format!(
            "Apply {} change(s) to '{}'?",
            changes.len(),
            target
        ))
    }
}

async fn apply(
    ctx: &Context,
    args: &MergeArgs,
    source: &SchemaRef,
    target: &SchemaRef,
    changes: &ChangeSet,
) -> CliResult<()> {
    println!("\nApplying changes to '{}'...", target);

    let pool = PgPool::new(ctx.pg_config(target)?)?;
    let conn = pool.get().await?;

    let continue_on_error = args.continue_on_error || ctx.config.merge.continue_on_error;
    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .or_else(|| ctx.config.merge.timeout());

    let mut applier = Applier::with_config(
        conn,
        ApplierConfig::new().continue_on_error(continue_on_error),
    );
    let outcome = applier.apply_until(changes, stop_signal(timeout)).await;
    pool.close();

    match outcome {
        Ok(result) if result.is_success() => {
            output::newline();
            output::success(&format!(
                "Successfully merged {} change(s) from '{}' into '{}'",
                result.applied.len(),
                source,
                target
            ));
            output::dim(&result.summary());
            Ok(())
        }
        Ok(result) => {
            println!("\n{} {}", "✗".red(), result.summary());
            println!("\nFailed changes:");
            for failed in &result.failed {
                print_failure(&failed.change.description(), &failed.sql, &failed.error);
            }
            Err(CliError::Command(format!(
                "{} of {} change(s) failed",
                result.failed.len(),
                changes.len()
            )))
        }
        Err(err) => {
            println!("\n{} Merge failed: {}", "✗".red(), err);
            if let Some(result) = err.apply_result() {
                if !result.failed.is_empty() {
                    println!("\nFailed change:");
                    for failed in &result.failed {
                        print_failure(&failed.change.description(), &failed.sql, &failed.error);
                    }
                }
            }
            Err(err.into())
        }
    }
}

fn print_failure(description: &str, sql: &str, error: &MigrationError) {
    output::list_item(description);
    println!("    SQL: {}", sql);
    println!("    Error: {}", error);
}

/// Completes on Ctrl-C or when `timeout` elapses.
async fn stop_signal(timeout: Option<Duration>) {
    let deadline = async {
        match timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        () = deadline => {}
    }
}

/// Statements a dry run prints, with description comments. A change that
/// cannot be rendered fails the whole dry run.
pub fn dry_run_statements(changes: &ChangeSet) -> CliResult<Vec<String>> {
    Ok(SqlGenerator::new().try_generate(changes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgbranch_migrate::{Change, ColumnAlteration};
    use pgbranch_schema::{Column, QualifiedName};

    #[test]
    fn test_file_label() {
        assert_eq!(file_label(&SchemaRef::parse("snapshots/feature.json")), "feature");
        assert_eq!(file_label(&SchemaRef::parse("feature/auth")), "feature/auth");
        assert_eq!(file_label(&SchemaRef::parse("postgres://u:p@host/main")), "main");
    }

    #[test]
    fn test_dry_run_statements_keep_comments() {
        let changes: ChangeSet = vec![Change::AddColumn {
            table: QualifiedName::new("users"),
            column: Column::new("email", "text"),
        }]
        .into_iter()
        .collect();

        assert_eq!(
            dry_run_statements(&changes).unwrap(),
            [
                "-- Add column users.email (text)",
                "ALTER TABLE users ADD COLUMN email text;",
            ]
        );
    }

    #[test]
    fn test_dry_run_statements_reject_unrenderable_change() {
        let column = Column::new("email", "text");
        let changes: ChangeSet = vec![Change::AlterColumn {
            table: QualifiedName::new("users"),
            column: "email".into(),
            alteration: ColumnAlteration::between(&column, &column),
            old: column.clone(),
            new: column,
        }]
        .into_iter()
        .collect();

        let err = dry_run_statements(&changes).unwrap_err();
        assert!(matches!(err, CliError::Migration(MigrationError::Render(_))));
    }
}
