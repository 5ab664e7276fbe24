//! Executing change sets against a database.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::change::{Change, ChangeSet};
use crate::error::{MigrateResult, MigrationError};
use crate::sql::SqlGenerator;

/// Minimal statement executor the applier drives.
///
/// Transactions are explicit so the applier owns their lifetime: it begins,
/// commits and, on every failure or cancellation path, rolls back.
#[async_trait::async_trait]
pub trait SqlExecutor: Send {
    /// Open a transaction.
    async fn begin(&mut self) -> MigrateResult<()>;

    /// Execute a statement inside the open transaction.
    async fn execute(&mut self, sql: &str) -> MigrateResult<()>;

    /// Commit the open transaction.
    async fn commit(&mut self) -> MigrateResult<()>;

    /// Roll back the open transaction.
    async fn rollback(&mut self) -> MigrateResult<()>;

    /// Execute a statement outside any transaction.
    async fn execute_autocommit(&mut self, sql: &str) -> MigrateResult<()> {
        self.execute(sql).await
    }
}

/// How a change set is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// One transaction; the first failure rolls everything back.
    #[default]
    Transactional,
    /// Each statement on its own; failures are collected and skipped.
    ContinueOnError,
}

/// Configuration for an [`Applier`].
#[derive(Debug, Clone, Default)]
pub struct ApplierConfig {
    /// Apply mode.
    pub mode: ApplyMode,
    /// Deadline for the whole apply.
    pub timeout: Option<Duration>,
}

impl ApplierConfig {
    /// Create a transactional configuration with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the apply mode.
    pub fn mode(mut self, mode: ApplyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for [`ApplyMode::ContinueOnError`] when `enabled`.
    pub fn continue_on_error(self, enabled: bool) -> Self {
        self.mode(if enabled {
            ApplyMode::ContinueOnError
        } else {
            ApplyMode::Transactional
        })
    }

    /// Set a deadline for the whole apply.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A change that could not be applied.
#[derive(Debug)]
pub struct FailedChange {
    /// The change.
    pub change: Change,
    /// The SQL that was attempted (empty if the change could not be rendered).
    pub sql: String,
    /// Why it failed.
    pub error: MigrationError,
}

/// Outcome of an apply.
#[derive(Debug, Default)]
pub struct ApplyResult {
    /// Changes whose SQL executed successfully.
    pub applied: Vec<Change>,
    /// Changes whose SQL failed.
    pub failed: Vec<FailedChange>,
    /// Wall time spent applying.
    pub duration_ms: u64,
}

impl ApplyResult {
    /// Whether nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Get a summary of the result.
    pub fn summary(&self) -> String {
        if self.failed.is_empty() {
            format!("{} change(s) applied in {}ms", self.applied.len(), self.duration_ms)
        } else {
            format!(
                "{} change(s) applied, {} failed in {}ms",
                self.applied.len(),
                self.failed.len(),
                self.duration_ms
            )
        }
    }
}

/// Applies ordered change sets through a [`SqlExecutor`].
pub struct Applier<E> {
    executor: E,
    config: ApplierConfig,
    generator: SqlGenerator,
}

/// Mutable progress shared between a run and its cancellation handler.
#[derive(Default)]
struct RunState {
    result: ApplyResult,
    in_transaction: bool,
}

impl<E: SqlExecutor> Applier<E> {
    /// Create a transactional applier.
    pub fn new(executor: E) -> Self {
        Self::with_config(executor, ApplierConfig::default())
    }

    /// Create an applier with a configuration.
    pub fn with_config(executor: E, config: ApplierConfig) -> Self {
        Self {
            executor,
            config,
            generator: SqlGenerator::new().with_comments(false),
        }
    }

    /// The configuration.
    pub fn config(&self) -> &ApplierConfig {
        &self.config
    }

    /// The underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Consume the applier, returning the executor.
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Apply a change set in the configured mode, honoring the configured
    /// timeout.
    ///
    /// In transactional mode a failed statement yields
    /// [`MigrationError::ApplyFailed`] and nothing is committed. In
    /// continue-on-error mode statement failures are collected in the result
    /// and this returns `Ok`.
    pub async fn apply(&mut self, cs: &ChangeSet) -> MigrateResult<ApplyResult> {
        match self.config.timeout {
            Some(timeout) => {
                let reason = format!("timed out after {}s", timeout.as_secs_f64());
                self.run_until(cs, tokio::time::sleep(timeout), reason)
                    .await
            }
            None => {
                self.run_until(cs, std::future::pending::<()>(), String::new())
                    .await
            }
        }
    }

    /// Apply, stopping early when `signal` completes. On cancellation an open
    /// transaction is rolled back and [`MigrationError::Cancelled`] is
    /// returned.
    pub async fn apply_until<F>(&mut self, cs: &ChangeSet, signal: F) -> MigrateResult<ApplyResult>
    where
        F: Future<Output = ()> + Send,
    {
        self.run_until(cs, signal, "cancelled by caller".to_string())
            .await
    }

    /// Apply in transactional mode regardless of configuration.
    pub async fn apply_transactional(&mut self, cs: &ChangeSet) -> MigrateResult<ApplyResult> {
        self.config.mode = ApplyMode::Transactional;
        self.apply(cs).await
    }

    /// Apply in continue-on-error mode regardless of configuration.
    pub async fn apply_continue_on_error(&mut self, cs: &ChangeSet) -> MigrateResult<ApplyResult> {
        self.config.mode = ApplyMode::ContinueOnError;
        self.apply(cs).await
    }

    /// Render the statements an apply would run, without executing anything.
    pub fn dry_run(&self, cs: &ChangeSet) -> MigrateResult<Vec<String>> {
        self.generator.try_generate(cs)
    }

    async fn run_until<F>(
        &mut self,
        cs: &ChangeSet,
        signal: F,
        cancel_reason: String,
    ) -> MigrateResult<ApplyResult>
    where
        F: Future<Output = ()> + Send,
    {
        if cs.is_empty() {
            return Ok(ApplyResult::default());
        }

        let mode = self.config.mode;
        info!(changes = cs.len(), mode = ?mode, "Applying change set");

        let start = Instant::now();
        let mut state = RunState::default();

        let outcome = {
            let run = run(&mut self.executor, &self.generator, mode, cs, &mut state);
            tokio::select! {
                outcome = run => Some(outcome),
                () = signal => None,
            }
        };

        state.result.duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Some(Ok(())) => {
                info!(
                    applied = state.result.applied.len(),
                    failed = state.result.failed.len(),
                    duration_ms = state.result.duration_ms,
                    "Change set applied"
                );
                Ok(state.result)
            }
            Some(Err(reason)) => Err(MigrationError::ApplyFailed {
                reason,
                result: Box::new(state.result),
            }),
            None => {
                warn!(reason = %cancel_reason, "Apply cancelled");
                if state.in_transaction {
                    rollback(&mut self.executor).await;
                }
                Err(MigrationError::Cancelled {
                    reason: cancel_reason,
                    result: Box::new(state.result),
                })
            }
        }
    }
}

/// Dry run with a default generator.
pub fn dry_run(cs: &ChangeSet) -> MigrateResult<Vec<String>> {
    SqlGenerator::new().with_comments(false).try_generate(cs)
}

/// Returns `Err(reason)` when a transactional run stopped on a failure. The
/// transaction is already rolled back in that case.
async fn run<E: SqlExecutor>(
    executor: &mut E,
    generator: &SqlGenerator,
    mode: ApplyMode,
    cs: &ChangeSet,
    state: &mut RunState,
) -> Result<(), String> {
    match mode {
        ApplyMode::Transactional => run_transactional(executor, generator, cs, state).await,
        ApplyMode::ContinueOnError => {
            run_continue_on_error(executor, generator, cs, state).await;
            Ok(())
        }
    }
}

async fn run_transactional<E: SqlExecutor>(
    executor: &mut E,
    generator: &SqlGenerator,
    cs: &ChangeSet,
    state: &mut RunState,
) -> Result<(), String> {
    // Marked before awaiting so a cancelled BEGIN is still rolled back.
    state.in_transaction = true;
    if let Err(e) = executor.begin().await {
        state.in_transaction = false;
        return Err(format!("failed to begin transaction: {e}"));
    }

    for change in cs {
        let (sql, outcome) = match generator.render(change) {
            Ok(sql) => {
                debug!(sql = %sql, "Executing statement");
                let outcome = executor.execute(&sql).await;
                (sql, outcome)
            }
            Err(e) => (String::new(), Err(e)),
        };

        if let Err(error) = outcome {
            warn!(change = %change, error = %error, "Statement failed, rolling back");
            let reason = format!("failed to apply change: {error}");
            state.result.failed.push(FailedChange {
                change: change.clone(),
                sql,
                error,
            });
            rollback(executor).await;
            state.in_transaction = false;
            return Err(reason);
        }

        state.result.applied.push(change.clone());
    }

    if let Err(e) = executor.commit().await {
        warn!(error = %e, "Commit failed, rolling back");
        rollback(executor).await;
        state.in_transaction = false;
        return Err(format!("failed to commit transaction: {e}"));
    }
    state.in_transaction = false;

    Ok(())
}

async fn run_continue_on_error<E: SqlExecutor>(
    executor: &mut E,
    generator: &SqlGenerator,
    cs: &ChangeSet,
    state: &mut RunState,
) {
    for change in cs {
        let sql = match generator.render(change) {
            Ok(sql) => sql,
            Err(error) => {
                warn!(change = %change, error = %error, "Skipping change");
                state.result.failed.push(FailedChange {
                    change: change.clone(),
                    sql: String::new(),
                    error,
                });
                continue;
            }
        };

        debug!(sql = %sql, "Executing statement");
        match executor.execute_autocommit(&sql).await {
            Ok(()) => state.result.applied.push(change.clone()),
            Err(error) => {
                warn!(change = %change, error = %error, "Statement failed, continuing");
                state.result.failed.push(FailedChange {
                    change: change.clone(),
                    sql,
                    error,
                });
            }
        }
    }
}

async fn rollback<E: SqlExecutor>(executor: &mut E) {
    if let Err(e) = executor.rollback().await {
        warn!(error = %e, "Rollback failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ColumnAlteration;
    use pgbranch_schema::{Column, Enum, QualifiedName, Table};
    use pretty_assertions::assert_eq;

    /// Records statements and simulates a single transaction.
    #[derive(Default)]
    struct MockExecutor {
        /// Statements that fail when executed.
        fail_on: Vec<String>,
        /// Statements visible after commit (or immediately in autocommit).
        committed: Vec<String>,
        /// Statements in the open transaction.
        pending: Vec<String>,
        in_transaction: bool,
        rollbacks: usize,
        /// Block forever on this statement.
        hang_on: Option<String>,
        /// Block forever on BEGIN.
        hang_on_begin: bool,
    }

    impl MockExecutor {
        fn failing_on(sql: &str) -> Self {
            Self {
                fail_on: vec![sql.to_string()],
                ..Self::default()
            }
        }
    }

    #[async_trait::async_trait]
    impl SqlExecutor for MockExecutor {
        async fn begin(&mut self) -> MigrateResult<()> {
            if self.hang_on_begin {
                std::future::pending::<()>().await;
            }
            self.in_transaction = true;
            Ok(())
        }

        async fn execute(&mut self, sql: &str) -> MigrateResult<()> {
            if self.hang_on.as_deref() == Some(sql) {
                std::future::pending::<()>().await;
            }
            if self.fail_on.iter().any(|s| s == sql) {
                return Err(MigrationError::database(format!("cannot run {sql}")));
            }
            if self.in_transaction {
                self.pending.push(sql.to_string());
            } else {
                self.committed.push(sql.to_string());
            }
            Ok(())
        }

        async fn commit(&mut self) -> MigrateResult<()> {
            self.committed.append(&mut self.pending);
            self.in_transaction = false;
            Ok(())
        }

        async fn rollback(&mut self) -> MigrateResult<()> {
            self.pending.clear();
            self.in_transaction = false;
            self.rollbacks += 1;
            Ok(())
        }
    }

    fn three_changes() -> ChangeSet {
        vec![
            Change::CreateEnum {
                definition: Enum::new("status", ["a"]),
            },
            Change::CreateTable {
                table: Table::new("broken").with_column(Column::new("id", "integer")),
            },
            Change::AddColumn {
                table: QualifiedName::new("users"),
                column: Column::new("email", "text"),
            },
        ]
        .into_iter()
        .collect()
    }

    const FAILING: &str = "CREATE TABLE broken (\n    id integer\n);";

    #[tokio::test]
    async fn test_empty_change_set_opens_no_transaction() {
        let mut applier = Applier::new(MockExecutor::default());
        let result = applier.apply(&ChangeSet::new()).await.unwrap();

        assert!(result.is_success());
        assert!(result.applied.is_empty());
        assert!(!applier.executor().in_transaction);
        assert_eq!(applier.executor().rollbacks, 0);
    }

    #[tokio::test]
    async fn test_transactional_success_commits() {
        let mut applier = Applier::new(MockExecutor::default());
        let result = applier.apply(&three_changes()).await.unwrap();

        assert_eq!(result.applied.len(), 3);
        assert_eq!(applier.executor().committed.len(), 3);
        assert_eq!(
            applier.executor().committed[0],
            "CREATE TYPE status AS ENUM ('a');"
        );
    }

    #[tokio::test]
    async fn test_transactional_failure_rolls_back_everything() {
        let mut applier = Applier::new(MockExecutor::failing_on(FAILING));
        let err = applier.apply(&three_changes()).await.unwrap_err();

        let result = err.apply_result().unwrap();
        assert_eq!(result.applied.len(), 1);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].sql, FAILING);
        assert!(matches!(err, MigrationError::ApplyFailed { .. }));

        let executor = applier.into_executor();
        assert!(executor.committed.is_empty());
        assert!(executor.pending.is_empty());
        assert_eq!(executor.rollbacks, 1);
    }

    #[tokio::test]
    async fn test_continue_on_error_collects_failures() {
        let config = ApplierConfig::new().continue_on_error(true);
        let mut applier = Applier::with_config(MockExecutor::failing_on(FAILING), config);
        let result = applier.apply(&three_changes()).await.unwrap();

        let applied: Vec<_> = result.applied.iter().map(Change::object_name).collect();
        assert_eq!(applied, ["status", "users.email"]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].change.object_name(), "broken");
        assert!(!result.is_success());
        assert_eq!(applier.executor().committed.len(), 2);
    }

    #[tokio::test]
    async fn test_unrenderable_change_aborts_transaction() {
        let noop = Change::AlterColumn {
            table: QualifiedName::new("t"),
            column: "a".into(),
            old: Column::new("a", "text"),
            new: Column::new("a", "text"),
            alteration: ColumnAlteration::default(),
        };
        let cs: ChangeSet = vec![noop].into_iter().collect();

        let mut applier = Applier::new(MockExecutor::default());
        let err = applier.apply(&cs).await.unwrap_err();
        let result = err.apply_result().unwrap();
        assert!(matches!(result.failed[0].error, MigrationError::Render(_)));
        assert_eq!(applier.executor().rollbacks, 1);
    }

    #[tokio::test]
    async fn test_cancellation_rolls_back() {
        let executor = MockExecutor {
            hang_on: Some(FAILING.to_string()),
            ..MockExecutor::default()
        };
        let mut applier = Applier::new(executor);

        let err = applier
            .apply_until(&three_changes(), tokio::time::sleep(Duration::from_millis(20)))
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::Cancelled { .. }));
        assert_eq!(err.apply_result().unwrap().applied.len(), 1);
        let executor = applier.into_executor();
        assert_eq!(executor.rollbacks, 1);
        assert!(executor.committed.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_during_begin_rolls_back() {
        let executor = MockExecutor {
            hang_on_begin: true,
            ..MockExecutor::default()
        };
        let mut applier = Applier::new(executor);

        let err = applier
            .apply_until(&three_changes(), tokio::time::sleep(Duration::from_millis(20)))
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::Cancelled { .. }));
        assert!(err.apply_result().unwrap().applied.is_empty());
        assert_eq!(applier.executor().rollbacks, 1);
    }

    #[tokio::test]
    async fn test_timeout_from_config() {
        let executor = MockExecutor {
            hang_on: Some(FAILING.to_string()),
            ..MockExecutor::default()
        };
        let config = ApplierConfig::new().timeout(Duration::from_millis(20));
        let mut applier = Applier::with_config(executor, config);

        let err = applier.apply(&three_changes()).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_dry_run() {
        let statements = dry_run(&three_changes()).unwrap();
        assert_eq!(statements.len(), 3);
        assert!(statements.iter().all(|s| !s.starts_with("--")));
        assert_eq!(statements[1], FAILING);
    }
}
