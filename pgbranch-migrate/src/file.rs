//! Migration file output.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::change::ChangeSet;
use crate::error::{MigrateResult, MigrationError};
use crate::sql::SqlGenerator;

/// Writes rendered change sets as timestamped `.sql` files.
pub struct MigrationFileWriter {
    /// Directory where migration files are written.
    migrations_dir: PathBuf,
    generator: SqlGenerator,
}

impl MigrationFileWriter {
    /// Create a writer for `migrations_dir`.
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
            generator: SqlGenerator::new(),
        }
    }

    /// Set whether statements are preceded by description comments.
    pub fn include_comments(mut self, include: bool) -> Self {
        self.generator = self.generator.with_comments(include);
        self
    }

    /// Get the migrations directory.
    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Write the migration that merges `source` into `target`, returning the
    /// path of the new file.
    pub async fn write(&self, cs: &ChangeSet, source: &str, target: &str) -> MigrateResult<PathBuf> {
        self.write_at(cs, source, target, Utc::now()).await
    }

    /// Like [`MigrationFileWriter::write`] with an explicit timestamp.
    pub async fn write_at(
        &self,
        cs: &ChangeSet,
        source: &str,
        target: &str,
        at: DateTime<Utc>,
    ) -> MigrateResult<PathBuf> {
        tokio::fs::create_dir_all(&self.migrations_dir)
            .await
            .map_err(MigrationError::Io)?;

        let description = format!("Merge {source} into {target}");
        let content = self.generator.migration_file_at(cs, &description, at)?;

        let path = self.migrations_dir.join(file_name(source, at));
        tokio::fs::write(&path, content)
            .await
            .map_err(MigrationError::Io)?;

        info!(path = %path.display(), changes = cs.len(), "Wrote migration file");
        Ok(path)
    }
}

/// `<YYYYMMDDHHMMSS>_merge_<source>.sql`
pub fn file_name(source: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_merge_{}.sql",
        at.format("%Y%m%d%H%M%S"),
        sanitize(source)
    )
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c == '/' || c.is_whitespace() { '_' } else { c })
        .collect()
}
