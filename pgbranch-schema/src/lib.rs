//! # pgbranch-schema
//!
//! Structural model of a PostgreSQL database, as compared by pgbranch.
//!
//! This crate provides:
//! - Plain data types for tables, columns, indexes, constraints, enums and
//!   functions
//! - The canonical type rendering and equality rules the differ relies on
//! - JSON snapshot files for capturing and replaying a schema
//!
//! ## Example
//!
//! ```rust
//! use pgbranch_schema::{Column, Schema, Table};
//!
//! let users = Table::new("users")
//!     .with_column(Column::new("id", "integer").nullable(false))
//!     .with_column(Column::new("email", "character varying").char_max_length(255));
//!
//! let schema = Schema::new("app").with_table(users);
//! assert_eq!(schema.tables["users"].columns["email"].full_type(), "varchar(255)");
//! ```

pub mod error;
pub mod model;
pub mod snapshot;

pub use error::{SchemaError, SchemaResult};
pub use model::*;
pub use snapshot::{from_json, load_snapshot, save_snapshot, to_json};
