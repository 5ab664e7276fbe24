//! # pgbranch-postgres
//!
//! PostgreSQL adapter for pgbranch.
//!
//! This crate provides:
//! - Connection configuration parsed from `postgres://` URLs
//! - Connection pooling using `deadpool-postgres`
//! - [`PgIntrospector`], reading a schema from the system catalogs
//! - [`PgConnection`] as the executor behind the migration applier
//!
//! ## Example
//!
//! ```rust,ignore
//! use pgbranch_migrate::{Applier, IntrospectionConfig, diff, extract_schema, order_changes};
//! use pgbranch_postgres::{PgIntrospector, PgPool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = PgPool::from_url("postgres://postgres@localhost/main")?;
//!     let feature = pool.config().with_database("feature_auth");
//!
//!     let config = IntrospectionConfig::default();
//!     let target = extract_schema(&PgIntrospector::new(pool.get().await?), &config, "main").await?;
//!     let source = extract_schema(
//!         &PgIntrospector::new(PgPool::new(feature)?.get().await?),
//!         &config,
//!         "feature_auth",
//!     )
//!     .await?;
//!
//!     let changes = order_changes(diff(&target, &source));
//!     let result = Applier::new(pool.get().await?).apply(&changes).await?;
//!     println!("{}", result.summary());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod introspect;
pub mod pool;

pub use config::{PgConfig, PgConfigBuilder, SslMode};
pub use connection::PgConnection;
pub use error::{PgError, PgResult};
pub use introspect::PgIntrospector;
pub use pool::{PgPool, PoolConfig};

use pgbranch_migrate::{IntrospectionConfig, MigrateResult, extract_schema};
use pgbranch_schema::Schema;

/// Read the schema of the database `config` points at.
pub async fn introspect(
    config: &PgConfig,
    introspection: &IntrospectionConfig,
) -> MigrateResult<Schema> {
    let pool = PgPool::new(config.clone())?;
    let introspector = PgIntrospector::new(pool.get().await?);
    let schema = extract_schema(&introspector, introspection, &config.database).await;
    pool.close();
    schema
}
