//! # pgbranch-migrate
//!
//! Schema comparison and migration engine for pgbranch.
//!
//! This crate provides functionality for:
//! - Diffing two schema snapshots into a change set
//! - Ordering changes so dependencies are satisfied
//! - Flagging risky changes before they run
//! - Rendering changes as PostgreSQL DDL and migration files
//! - Applying a change set transactionally or statement by statement
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────┐
//! │ Introspector │────▶│ Schema Differ  │────▶│ Orderer     │
//! └──────────────┘     └────────────────┘     └─────────────┘
//!                                                    │
//!                              ┌─────────────────────┤
//!                              ▼                     ▼
//!                      ┌────────────────┐     ┌─────────────┐
//!                      │ Validator      │     │ SQL Gen     │
//!                      └────────────────┘     └─────────────┘
//!                                                    │
//!                                                    ▼
//!                                            ┌─────────────┐
//!                                            │ Applier     │
//!                                            └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pgbranch_migrate::{SqlGenerator, diff, order_changes, validate_changes};
//! use pgbranch_schema::{Column, Schema, Table};
//!
//! let main = Schema::new("main")
//!     .with_table(Table::new("users").with_column(Column::new("id", "integer")));
//! let feature = Schema::new("feature").with_table(
//!     Table::new("users")
//!         .with_column(Column::new("id", "integer"))
//!         .with_column(Column::new("email", "text")),
//! );
//!
//! let changes = order_changes(diff(&main, &feature));
//! assert!(validate_changes(&changes).is_clean());
//!
//! let sql = SqlGenerator::new().with_comments(false).generate(&changes);
//! assert_eq!(sql, ["ALTER TABLE users ADD COLUMN email text;"]);
//! ```

#![warn(missing_docs)]

pub mod apply;
pub mod change;
pub mod diff;
pub mod error;
pub mod file;
pub mod introspect;
pub mod order;
pub mod sql;
pub mod stat;
pub mod validate;

// Re-exports
pub use apply::{
    Applier, ApplierConfig, ApplyMode, ApplyResult, FailedChange, SqlExecutor, dry_run,
};
pub use change::{
    Change, ChangeBucket, ChangeSet, ChangeSetBuilder, ChangeType, ColumnAlteration,
};
pub use diff::{SchemaDiffer, diff};
pub use error::{MigrateResult, MigrationError};
pub use file::MigrationFileWriter;
pub use introspect::{
    ColumnInfo, ConstraintInfo, EnumInfo, FunctionInfo, IndexInfo, IntrospectionConfig,
    Introspector, TableInfo, extract_schema,
};
pub use order::{PHASES, order_changes};
pub use sql::{SqlGenerator, quote_ident, quote_literal, quote_qualified};
pub use stat::DiffStat;
pub use validate::{Validation, validate_changes};
