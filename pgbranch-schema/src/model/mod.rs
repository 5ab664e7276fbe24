//! Schema model types.

mod column;
mod constraint;
mod enum_type;
mod function;
mod index;
mod name;
mod schema;
mod table;

pub use column::Column;
pub use constraint::{Constraint, ConstraintKind};
pub use enum_type::Enum;
pub use function::{Function, body_hash};
pub use index::Index;
pub use name::{DEFAULT_SCHEMA, QualifiedName, is_default_schema};
pub use schema::Schema;
pub use table::Table;
