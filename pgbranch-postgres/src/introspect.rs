//! Catalog queries for PostgreSQL.

use pgbranch_migrate::{
    ColumnInfo, ConstraintInfo, EnumInfo, FunctionInfo, IndexInfo, IntrospectionConfig,
    Introspector, MigrateResult, TableInfo,
};
use tokio_postgres::Row;

use crate::connection::PgConnection;
use crate::error::PgResult;

const TABLES_SQL: &str = r#"
SELECT table_name::text, table_schema::text
FROM information_schema.tables
WHERE table_schema::text <> ALL($1::text[])
  AND table_type = 'BASE TABLE'
ORDER BY table_schema, table_name
"#;

const COLUMNS_SQL: &str = r#"
SELECT
    column_name::text,
    data_type::text,
    udt_name::text,
    is_nullable::text,
    column_default::text,
    ordinal_position::int4,
    character_maximum_length::int4,
    numeric_precision::int4,
    numeric_scale::int4
FROM information_schema.columns
WHERE table_schema::text = $1 AND table_name::text = $2
ORDER BY ordinal_position
"#;

const INDEXES_SQL: &str = r#"
SELECT
    i.relname::text AS index_name,
    ARRAY(
        SELECT a.attname::text
        FROM unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord)
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum
        ORDER BY k.ord
    ) AS columns,
    ix.indisunique,
    ix.indisprimary,
    am.amname::text AS index_method,
    pg_get_indexdef(ix.indexrelid) AS definition
FROM pg_index ix
JOIN pg_class t ON t.oid = ix.indrelid
JOIN pg_class i ON i.oid = ix.indexrelid
JOIN pg_namespace n ON n.oid = t.relnamespace
JOIN pg_am am ON am.oid = i.relam
WHERE n.nspname::text = $1 AND t.relname::text = $2
ORDER BY i.relname
"#;

const CONSTRAINTS_SQL: &str = r#"
SELECT
    c.conname::text,
    CASE c.contype
        WHEN 'p' THEN 'PRIMARY KEY'
        WHEN 'f' THEN 'FOREIGN KEY'
        WHEN 'u' THEN 'UNIQUE'
        WHEN 'c' THEN 'CHECK'
        WHEN 'x' THEN 'EXCLUDE'
    END AS constraint_type,
    ARRAY(
        SELECT a.attname::text
        FROM unnest(c.conkey) WITH ORDINALITY AS k(attnum, ord)
        JOIN pg_attribute a ON a.attrelid = c.conrelid AND a.attnum = k.attnum
        ORDER BY k.ord
    ) AS columns,
    pg_get_constraintdef(c.oid) AS definition,
    rt.relname::text AS ref_table,
    ARRAY(
        SELECT a.attname::text
        FROM unnest(c.confkey) WITH ORDINALITY AS k(attnum, ord)
        JOIN pg_attribute a ON a.attrelid = c.confrelid AND a.attnum = k.attnum
        ORDER BY k.ord
    ) AS ref_columns,
    CASE c.confdeltype
        WHEN 'a' THEN 'NO ACTION'
        WHEN 'r' THEN 'RESTRICT'
        WHEN 'c' THEN 'CASCADE'
        WHEN 'n' THEN 'SET NULL'
        WHEN 'd' THEN 'SET DEFAULT'
    END AS on_delete,
    CASE c.confupdtype
        WHEN 'a' THEN 'NO ACTION'
        WHEN 'r' THEN 'RESTRICT'
        WHEN 'c' THEN 'CASCADE'
        WHEN 'n' THEN 'SET NULL'
        WHEN 'd' THEN 'SET DEFAULT'
    END AS on_update
FROM pg_constraint c
JOIN pg_class t ON t.oid = c.conrelid
JOIN pg_namespace n ON n.oid = t.relnamespace
LEFT JOIN pg_class rt ON rt.oid = c.confrelid
WHERE n.nspname::text = $1 AND t.relname::text = $2
  AND c.contype IN ('p', 'f', 'u', 'c', 'x')
ORDER BY c.conname
"#;

const ENUMS_SQL: &str = r#"
SELECT
    t.typname::text,
    n.nspname::text,
    ARRAY(
        SELECT e.enumlabel::text
        FROM pg_enum e
        WHERE e.enumtypid = t.oid
        ORDER BY e.enumsortorder
    ) AS labels
FROM pg_type t
JOIN pg_namespace n ON n.oid = t.typnamespace
WHERE t.typtype = 'e' AND n.nspname::text <> ALL($1::text[])
ORDER BY n.nspname, t.typname
"#;

const FUNCTIONS_SQL: &str = r#"
SELECT
    p.proname::text,
    n.nspname::text,
    pg_get_function_arguments(p.oid) AS arguments,
    pg_get_function_result(p.oid) AS return_type,
    l.lanname::text AS language,
    pg_get_functiondef(p.oid) AS definition
FROM pg_proc p
JOIN pg_namespace n ON n.oid = p.pronamespace
JOIN pg_language l ON l.oid = p.prolang
WHERE n.nspname::text <> ALL($1::text[])
  AND p.prokind IN ('f', 'p')
ORDER BY n.nspname, p.proname, arguments
"#;

/// Reads schema objects from the PostgreSQL system catalogs.
pub struct PgIntrospector {
    conn: PgConnection,
}

impl PgIntrospector {
    /// Introspect through `conn`.
    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }

    /// Give the connection back.
    pub fn into_inner(self) -> PgConnection {
        self.conn
    }
}

fn table_info(row: &Row) -> PgResult<TableInfo> {
    Ok(TableInfo {
        name: row.try_get(0)?,
        schema: row.try_get(1)?,
    })
}

fn column_info(row: &Row) -> PgResult<ColumnInfo> {
    Ok(ColumnInfo {
        name: row.try_get(0)?,
        data_type: row.try_get(1)?,
        udt_name: row.try_get(2)?,
        is_nullable: row.try_get(3)?,
        column_default: row.try_get(4)?,
        ordinal_position: row.try_get(5)?,
        character_maximum_length: row.try_get(6)?,
        numeric_precision: row.try_get(7)?,
        numeric_scale: row.try_get(8)?,
    })
}

fn index_info(row: &Row) -> PgResult<IndexInfo> {
    Ok(IndexInfo {
        name: row.try_get(0)?,
        columns: row.try_get(1)?,
        is_unique: row.try_get(2)?,
        is_primary: row.try_get(3)?,
        index_method: row.try_get(4)?,
        definition: row.try_get(5)?,
    })
}

fn constraint_info(row: &Row) -> PgResult<ConstraintInfo> {
    Ok(ConstraintInfo {
        name: row.try_get(0)?,
        constraint_type: row.try_get(1)?,
        columns: row.try_get(2)?,
        definition: row.try_get(3)?,
        referenced_table: row.try_get(4)?,
        referenced_columns: row.try_get(5)?,
        on_delete: row.try_get(6)?,
        on_update: row.try_get(7)?,
    })
}

fn enum_info(row: &Row) -> PgResult<EnumInfo> {
    Ok(EnumInfo {
        name: row.try_get(0)?,
        schema: row.try_get(1)?,
        values: row.try_get(2)?,
    })
}

fn function_info(row: &Row) -> PgResult<FunctionInfo> {
    // Procedures have no result type.
    let return_type: Option<String> = row.try_get(3)?;
    Ok(FunctionInfo {
        name: row.try_get(0)?,
        schema: row.try_get(1)?,
        arguments: row.try_get(2)?,
        return_type: return_type.unwrap_or_default(),
        language: row.try_get(4)?,
        definition: row.try_get(5)?,
    })
}

fn collect<T>(rows: Vec<Row>, convert: fn(&Row) -> PgResult<T>) -> MigrateResult<Vec<T>> {
    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        out.push(convert(row)?);
    }
    Ok(out)
}

#[async_trait::async_trait]
impl Introspector for PgIntrospector {
    async fn get_tables(&self, config: &IntrospectionConfig) -> MigrateResult<Vec<TableInfo>> {
        let rows = self
            .conn
            .query(TABLES_SQL, &[&config.excluded_schemas])
            .await?;
        collect(rows, table_info)
    }

    async fn get_columns(&self, table: &str, schema: &str) -> MigrateResult<Vec<ColumnInfo>> {
        let rows = self.conn.query(COLUMNS_SQL, &[&schema, &table]).await?;
        collect(rows, column_info)
    }

    async fn get_indexes(&self, table: &str, schema: &str) -> MigrateResult<Vec<IndexInfo>> {
        let rows = self.conn.query(INDEXES_SQL, &[&schema, &table]).await?;
        collect(rows, index_info)
    }

    async fn get_constraints(
        &self,
        table: &str,
        schema: &str,
    ) -> MigrateResult<Vec<ConstraintInfo>> {
        let rows = self.conn.query(CONSTRAINTS_SQL, &[&schema, &table]).await?;
        collect(rows, constraint_info)
    }

    async fn get_enums(&self, config: &IntrospectionConfig) -> MigrateResult<Vec<EnumInfo>> {
        let rows = self
            .conn
            .query(ENUMS_SQL, &[&config.excluded_schemas])
            .await?;
        collect(rows, enum_info)
    }

    async fn get_functions(
        &self,
        config: &IntrospectionConfig,
    ) -> MigrateResult<Vec<FunctionInfo>> {
        let rows = self
            .conn
            .query(FUNCTIONS_SQL, &[&config.excluded_schemas])
            .await?;
        collect(rows, function_info)
    }
}
