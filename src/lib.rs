//! # pgbranch
//!
//! Compare PostgreSQL schemas across database branches and merge them.
//!
//! pgbranch provides:
//! - A serializable snapshot model of a PostgreSQL schema
//! - A differ that turns two snapshots into a typed change set
//! - Dependency-aware ordering and advisory validation of changes
//! - DDL generation, migration files and transactional application
//! - Catalog introspection over a pooled `tokio-postgres` connection
//!
//! ## Quick Start
//!
//! ```rust
//! use pgbranch::prelude::*;
//!
//! let main = Schema::new("main").with_table(
//!     Table::new("users").with_column(Column::new("id", "integer").nullable(false)),
//! );
//! let feature = Schema::new("feature").with_table(
//!     Table::new("users")
//!         .with_column(Column::new("id", "integer").nullable(false))
//!         .with_column(Column::new("email", "text")),
//! );
//!
//! let changes = order_changes(diff(&main, &feature));
//! assert_eq!(DiffStat::from_change_set(&changes).additions, 1);
//!
//! let sql = dry_run(&changes).unwrap();
//! assert_eq!(sql, ["ALTER TABLE users ADD COLUMN email text;"]);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Schema snapshot model.
pub mod schema {
    pub use pgbranch_schema::*;
}

/// Diffing, ordering, validation, SQL generation and application.
pub mod migrate {
    pub use pgbranch_migrate::*;
}

/// PostgreSQL connectivity and catalog introspection.
#[cfg(feature = "postgres")]
#[cfg_attr(docsrs, doc(cfg(feature = "postgres")))]
pub mod postgres {
    pub use pgbranch_postgres::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        Applier, ApplierConfig, ApplyMode, ApplyResult, Change, ChangeSet, ChangeType, DiffStat,
        MigrateResult, MigrationError, MigrationFileWriter, SqlExecutor, SqlGenerator, Validation,
        diff, dry_run, order_changes, validate_changes,
    };
    pub use crate::schema::{
        Column, Constraint, ConstraintKind, Enum, Function, Index, QualifiedName, Schema, Table,
        load_snapshot, save_snapshot,
    };

    #[cfg(feature = "postgres")]
    pub use crate::postgres::{PgConfig, PgPool, introspect};
}

// Re-export key types at the crate root
pub use migrate::{ChangeSet, MigrationError};
pub use schema::{Schema, SchemaError};
