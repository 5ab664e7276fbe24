//! `pgbranch snapshot` - capture a schema as JSON.

use pgbranch_schema::save_snapshot;

use crate::cli::SnapshotArgs;
use crate::error::CliResult;
use crate::output;
use crate::source::{Context, SchemaRef};

/// Run the snapshot command
pub async fn run(ctx: &Context, args: SnapshotArgs) -> CliResult<()> {
    let reference = SchemaRef::parse(&args.reference);
    let schema = ctx.load_schema(&reference).await?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    save_snapshot(&schema, &args.output)?;

    output::success(&format!(
        "Saved snapshot of '{}' to {} ({} tables, {} enums, {} functions)",
        reference,
        args.output.display(),
        schema.tables.len(),
        schema.enums.len(),
        schema.functions.len()
    ));
    Ok(())
}
