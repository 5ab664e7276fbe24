//! PostgreSQL connection wrapper.

use deadpool_postgres::Object;
use pgbranch_migrate::{MigrateResult, SqlExecutor};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::debug;

use crate::error::PgResult;

/// A pooled PostgreSQL connection.
///
/// Implements [`SqlExecutor`] with plain `BEGIN`/`COMMIT`/`ROLLBACK` so the
/// applier controls the transaction across awaits.
pub struct PgConnection {
    client: Object,
}

impl PgConnection {
    pub(crate) fn new(client: Object) -> Self {
        Self { client }
    }

    /// Execute a query and return all rows.
    pub async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> PgResult<Vec<Row>> {
        debug!(sql = %sql, "Executing query");
        let rows = self.client.query(sql, params).await?;
        Ok(rows)
    }

    /// Execute one or more statements without parameters.
    pub async fn batch_execute(&self, sql: &str) -> PgResult<()> {
        debug!(sql = %sql, "Executing batch");
        self.client.batch_execute(sql).await?;
        Ok(())
    }

    /// Get the underlying pooled client.
    pub fn inner(&self) -> &Object {
        &self.client
    }
}

#[async_trait::async_trait]
impl SqlExecutor for PgConnection {
    async fn begin(&mut self) -> MigrateResult<()> {
        self.batch_execute("BEGIN").await?;
        Ok(())
    }

    async fn execute(&mut self, sql: &str) -> MigrateResult<()> {
        self.batch_execute(sql).await?;
        Ok(())
    }

    async fn commit(&mut self) -> MigrateResult<()> {
        self.batch_execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&mut self) -> MigrateResult<()> {
        self.batch_execute("ROLLBACK").await?;
        Ok(())
    }
}
