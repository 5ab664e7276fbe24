//! Database introspection boundary.
//!
//! An [`Introspector`] returns raw catalog rows; [`extract_schema`] turns them
//! into a [`Schema`]. Drivers implement the trait, the conversion rules live
//! here so every driver produces the same model.

use pgbranch_schema::{Column, Constraint, ConstraintKind, Enum, Function, Index, Schema, Table};
use tracing::debug;

use crate::error::{MigrateResult, MigrationError};

/// Configuration for introspection.
#[derive(Debug, Clone)]
pub struct IntrospectionConfig {
    /// Schemas never read.
    pub excluded_schemas: Vec<String>,
    /// Tables to include (empty = all).
    pub include_tables: Vec<String>,
    /// Tables to exclude.
    pub exclude_tables: Vec<String>,
    /// Whether to read enum types.
    pub include_enums: bool,
    /// Whether to read functions and procedures.
    pub include_functions: bool,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            excluded_schemas: vec!["pg_catalog".to_string(), "information_schema".to_string()],
            include_tables: Vec::new(),
            exclude_tables: Vec::new(),
            include_enums: true,
            include_functions: true,
        }
    }
}

impl IntrospectionConfig {
    /// Create a new introspection config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include only these tables.
    pub fn include_tables(mut self, tables: Vec<String>) -> Self {
        self.include_tables = tables;
        self
    }

    /// Exclude these tables.
    pub fn exclude_tables(mut self, tables: Vec<String>) -> Self {
        self.exclude_tables = tables;
        self
    }

    /// Whether to include enums.
    pub fn include_enums(mut self, include: bool) -> Self {
        self.include_enums = include;
        self
    }

    /// Whether to include functions.
    pub fn include_functions(mut self, include: bool) -> Self {
        self.include_functions = include;
        self
    }

    /// Check if a schema should be read.
    pub fn should_include_schema(&self, schema: &str) -> bool {
        !self.excluded_schemas.iter().any(|s| s == schema)
    }

    /// Check if a table should be included.
    pub fn should_include_table(&self, name: &str) -> bool {
        if self.exclude_tables.iter().any(|t| t == name) {
            return false;
        }
        self.include_tables.is_empty() || self.include_tables.iter().any(|t| t == name)
    }
}

/// Raw table row.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    pub schema: String,
}

/// Raw column row, as `information_schema.columns` reports it.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Data type (e.g., "integer", "character varying", "ARRAY", "USER-DEFINED").
    pub data_type: String,
    /// UDT name (e.g., "int4", "_text").
    pub udt_name: String,
    /// "YES" or "NO".
    pub is_nullable: String,
    /// Default value expression.
    pub column_default: Option<String>,
    /// Ordinal position.
    pub ordinal_position: i32,
    /// Character maximum length (for varchar, etc.).
    pub character_maximum_length: Option<i32>,
    /// Numeric precision.
    pub numeric_precision: Option<i32>,
    /// Numeric scale.
    pub numeric_scale: Option<i32>,
}

impl From<ColumnInfo> for Column {
    fn from(info: ColumnInfo) -> Self {
        let mut column = Column {
            name: info.name,
            data_type: info.data_type,
            is_nullable: info.is_nullable == "YES",
            default: info.column_default,
            position: info.ordinal_position,
            char_max_length: info.character_maximum_length,
            numeric_precision: info.numeric_precision,
            numeric_scale: info.numeric_scale,
            is_array: false,
            element_type: None,
        };

        match column.data_type.as_str() {
            "ARRAY" => {
                let element = info.udt_name.trim_start_matches('_').to_string();
                column.is_array = true;
                column.data_type = element.clone();
                column.element_type = Some(element);
            }
            // Enums, domains and extension types report their name only in udt_name.
            "USER-DEFINED" => column.data_type = info.udt_name,
            _ => {}
        }

        column
    }
}

/// Raw index row.
#[derive(Debug, Clone, Default)]
pub struct IndexInfo {
    /// Index name.
    pub name: String,
    /// Columns in key order.
    pub columns: Vec<String>,
    /// Whether the index is unique.
    pub is_unique: bool,
    /// Whether this is a primary key index.
    pub is_primary: bool,
    /// Index method (btree, hash, etc.).
    pub index_method: String,
    /// `pg_get_indexdef` output.
    pub definition: String,
}

impl IndexInfo {
    fn into_index(self, table_name: &str) -> Index {
        Index {
            name: self.name,
            table_name: table_name.to_string(),
            columns: self.columns,
            is_unique: self.is_unique,
            is_primary: self.is_primary,
            method: self.index_method,
            definition: self.definition,
        }
    }
}

/// Raw constraint row.
#[derive(Debug, Clone, Default)]
pub struct ConstraintInfo {
    /// Constraint name.
    pub name: String,
    /// Constraint type keyword or catalog code.
    pub constraint_type: String,
    /// Columns in the constraint.
    pub columns: Vec<String>,
    /// `pg_get_constraintdef` output.
    pub definition: String,
    /// Referenced table (for foreign keys).
    pub referenced_table: Option<String>,
    /// Referenced columns (for foreign keys).
    pub referenced_columns: Vec<String>,
    /// On delete action (for foreign keys).
    pub on_delete: Option<String>,
    /// On update action (for foreign keys).
    pub on_update: Option<String>,
}

impl ConstraintInfo {
    fn into_constraint(self, table_name: &str) -> MigrateResult<Constraint> {
        let kind: ConstraintKind = self
            .constraint_type
            .parse()
            .map_err(|e| MigrationError::database(format!("constraint {}: {e}", self.name)))?;
        let mut constraint =
            Constraint::new(self.name, kind, table_name, self.definition).columns(self.columns);
        if let Some(table) = self.referenced_table {
            constraint = constraint.references(table, self.referenced_columns);
        }
        constraint.on_delete = self.on_delete;
        constraint.on_update = self.on_update;
        Ok(constraint)
    }
}

/// Raw enum row.
#[derive(Debug, Clone)]
pub struct EnumInfo {
    /// Enum name.
    pub name: String,
    /// Schema the enum belongs to.
    pub schema: String,
    /// Labels in sort order.
    pub values: Vec<String>,
}

/// Raw function row.
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub name: String,
    pub schema: String,
    pub arguments: String,
    pub return_type: String,
    pub language: String,
    pub definition: String,
}

impl From<FunctionInfo> for Function {
    fn from(info: FunctionInfo) -> Self {
        Function::new(info.name, info.arguments, info.return_type, info.definition)
            .in_schema(info.schema)
            .language(info.language)
    }
}

/// Trait for database introspection.
#[async_trait::async_trait]
pub trait Introspector: Send + Sync {
    /// Get all base tables (no views).
    async fn get_tables(&self, config: &IntrospectionConfig) -> MigrateResult<Vec<TableInfo>>;

    /// Get columns for a table, ordered by position.
    async fn get_columns(&self, table: &str, schema: &str) -> MigrateResult<Vec<ColumnInfo>>;

    /// Get indexes for a table.
    async fn get_indexes(&self, table: &str, schema: &str) -> MigrateResult<Vec<IndexInfo>>;

    /// Get constraints for a table.
    async fn get_constraints(
        &self,
        table: &str,
        schema: &str,
    ) -> MigrateResult<Vec<ConstraintInfo>>;

    /// Get all enum types with labels in sort order.
    async fn get_enums(&self, config: &IntrospectionConfig) -> MigrateResult<Vec<EnumInfo>>;

    /// Get all functions and procedures.
    async fn get_functions(
        &self,
        config: &IntrospectionConfig,
    ) -> MigrateResult<Vec<FunctionInfo>>;
}

/// Read a complete schema through `introspector`.
pub async fn extract_schema<I>(
    introspector: &I,
    config: &IntrospectionConfig,
    name: &str,
) -> MigrateResult<Schema>
where
    I: Introspector + ?Sized,
{
    let mut schema = Schema::new(name);

    if config.include_enums {
        for info in introspector.get_enums(config).await? {
            if !config.should_include_schema(&info.schema) {
                continue;
            }
            schema.add_enum(Enum::new(info.name, info.values).in_schema(info.schema));
        }
    }

    for info in introspector.get_tables(config).await? {
        if !config.should_include_schema(&info.schema) || !config.should_include_table(&info.name)
        {
            continue;
        }

        let mut table = Table::new(info.name.clone()).in_schema(info.schema.clone());

        for column in introspector.get_columns(&info.name, &info.schema).await? {
            table.add_column(column.into());
        }
        for index in introspector.get_indexes(&info.name, &info.schema).await? {
            table.add_index(index.into_index(&info.name));
        }
        for constraint in introspector
            .get_constraints(&info.name, &info.schema)
            .await?
        {
            table.add_constraint(constraint.into_constraint(&info.name)?);
        }

        schema.add_table(table);
    }

    if config.include_functions {
        for info in introspector.get_functions(config).await? {
            if !config.should_include_schema(&info.schema) {
                continue;
            }
            schema.add_function(info.into());
        }
    }

    debug!(
        schema = %name,
        tables = schema.tables.len(),
        enums = schema.enums.len(),
        functions = schema.functions.len(),
        "Extracted schema"
    );

    Ok(schema)
}
