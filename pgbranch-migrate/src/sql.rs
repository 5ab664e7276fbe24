//! SQL generation for PostgreSQL.

use chrono::{DateTime, SecondsFormat, Utc};
use pgbranch_schema::{Column, Constraint, Index, QualifiedName, Table};

use crate::change::{Change, ChangeSet, ColumnAlteration};
use crate::error::{MigrateResult, MigrationError};

/// Words that always need quoting even though they look like plain identifiers.
const RESERVED_WORDS: &[&str] = &[
    "select", "from", "where", "table", "index", "user", "order", "group", "by", "as", "on",
    "join",
];

/// Renders changes into PostgreSQL DDL.
#[derive(Debug, Clone)]
pub struct SqlGenerator {
    /// Precede each statement with a `--` comment describing the change.
    pub include_comments: bool,
}

impl Default for SqlGenerator {
    fn default() -> Self {
        Self {
            include_comments: true,
        }
    }
}

impl SqlGenerator {
    /// Create a generator that emits comments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether comments are emitted.
    pub fn with_comments(mut self, include_comments: bool) -> Self {
        self.include_comments = include_comments;
        self
    }

    /// Render every change, each optionally preceded by its comment line.
    /// Changes that render to nothing are skipped.
    pub fn generate(&self, cs: &ChangeSet) -> Vec<String> {
        let mut statements = Vec::new();

        for change in cs {
            let sql = self.generate_change(change);
            if sql.is_empty() {
                continue;
            }
            if self.include_comments {
                statements.push(comment(change));
            }
            statements.push(sql);
        }

        statements
    }

    /// Like [`SqlGenerator::generate`], but a change that renders to nothing
    /// is an error instead of being skipped.
    pub fn try_generate(&self, cs: &ChangeSet) -> MigrateResult<Vec<String>> {
        let mut statements = Vec::new();

        for change in cs {
            let sql = self.render(change)?;
            if self.include_comments {
                statements.push(comment(change));
            }
            statements.push(sql);
        }

        Ok(statements)
    }

    /// Render one change, failing if it produces no SQL.
    pub fn render(&self, change: &Change) -> MigrateResult<String> {
        let sql = self.generate_change(change);
        if sql.is_empty() {
            return Err(MigrationError::render(change.description()));
        }
        Ok(sql)
    }

    /// Render one change. `AlterColumn` may produce several newline-joined
    /// statements; an alteration with nothing to do renders as empty.
    pub fn generate_change(&self, change: &Change) -> String {
        match change {
            Change::CreateTable { table } => self.create_table(table),
            Change::DropTable { table } => {
                format!("DROP TABLE {};", quote_qualified(&table.qualified_name()))
            }
            Change::AddColumn { table, column } => format!(
                "ALTER TABLE {} ADD COLUMN {};",
                quote_qualified(table),
                column_definition(column)
            ),
            Change::DropColumn { table, column } => format!(
                "ALTER TABLE {} DROP COLUMN {};",
                quote_qualified(table),
                quote_ident(&column.name)
            ),
            Change::AlterColumn {
                table,
                column,
                alteration,
                ..
            } => alter_column(table, column, alteration),
            Change::CreateIndex { table, index } => create_index(table, index),
            Change::DropIndex { table, index } => format!(
                "DROP INDEX {};",
                quote_qualified(&sibling(table, &index.name))
            ),
            Change::AddConstraint { table, constraint } => add_constraint(table, constraint),
            Change::DropConstraint { table, constraint } => format!(
                "ALTER TABLE {} DROP CONSTRAINT {};",
                quote_qualified(table),
                quote_ident(&constraint.name)
            ),
            Change::CreateEnum { definition } => {
                let values: Vec<String> = definition.values.iter().map(|v| quote_literal(v)).collect();
                format!(
                    "CREATE TYPE {} AS ENUM ({});",
                    quote_qualified(&definition.qualified_name()),
                    values.join(", ")
                )
            }
            Change::DropEnum { definition } => format!(
                "DROP TYPE {};",
                quote_qualified(&definition.qualified_name())
            ),
            Change::AddEnumValue {
                enum_name,
                value,
                after,
            } => match after {
                Some(after) => format!(
                    "ALTER TYPE {} ADD VALUE {} AFTER {};",
                    quote_qualified(enum_name),
                    quote_literal(value),
                    quote_literal(after)
                ),
                None => format!(
                    "ALTER TYPE {} ADD VALUE {};",
                    quote_qualified(enum_name),
                    quote_literal(value)
                ),
            },
            Change::CreateFunction { function } => terminate(&function.definition),
            Change::DropFunction { function } => format!(
                "DROP FUNCTION {}({});",
                quote_qualified(&QualifiedName::qualified(
                    function.schema.clone(),
                    function.name.clone()
                )),
                function.arguments
            ),
            Change::ReplaceFunction { new, .. } => {
                let definition = new.definition.trim_start();
                match definition.strip_prefix("CREATE FUNCTION") {
                    Some(rest) => terminate(&format!("CREATE OR REPLACE FUNCTION{rest}")),
                    None => terminate(definition),
                }
            }
        }
    }

    /// Assemble a complete migration file stamped with the current time.
    pub fn migration_file(&self, cs: &ChangeSet, description: &str) -> MigrateResult<String> {
        self.migration_file_at(cs, description, Utc::now())
    }

    /// Assemble a complete migration file with an explicit timestamp.
    pub fn migration_file_at(
        &self,
        cs: &ChangeSet,
        description: &str,
        generated_at: DateTime<Utc>,
    ) -> MigrateResult<String> {
        let mut out = String::new();

        out.push_str("-- Migration generated by pgbranch\n");
        out.push_str(&format!(
            "-- Generated at: {}\n",
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        if !description.is_empty() {
            out.push_str(&format!("-- Description: {description}\n"));
        }
        out.push('\n');

        let summary = cs.summary();
        if !summary.is_empty() {
            out.push_str("-- Changes:\n");
            for (change_type, count) in &summary {
                out.push_str(&format!("--   {change_type}: {count}\n"));
            }
            out.push('\n');
        }

        if cs.has_destructive() {
            out.push_str(&format!(
                "-- WARNING: This migration contains {} destructive change(s)\n\n",
                cs.destructive_count()
            ));
        }

        out.push_str("BEGIN;\n\n");
        for statement in self.try_generate(cs)? {
            out.push_str(&statement);
            out.push('\n');
            if !statement.starts_with("--") {
                out.push('\n');
            }
        }
        out.push_str("COMMIT;\n");

        Ok(out)
    }

    fn create_table(&self, table: &Table) -> String {
        let name = table.qualified_name();
        let columns: Vec<String> = table
            .sorted_columns()
            .into_iter()
            .map(|c| format!("    {}", column_definition(c)))
            .collect();

        let mut statements = vec![format!(
            "CREATE TABLE {} (\n{}\n);",
            quote_qualified(&name),
            columns.join(",\n")
        )];

        // Primary key first so later constraints can reference it.
        let (primary, others): (Vec<&Constraint>, Vec<&Constraint>) = table
            .sorted_constraints()
            .into_iter()
            .partition(|c| c.is_primary_key());
        for constraint in primary.into_iter().chain(others) {
            statements.push(add_constraint(&name, constraint));
        }

        for index in table.sorted_indexes() {
            if index.is_primary || table.constraints.contains_key(&index.name) {
                continue;
            }
            statements.push(create_index(&name, index));
        }

        statements.join("\n")
    }
}

fn comment(change: &Change) -> String {
    let destructive = if change.is_destructive() {
        " (DESTRUCTIVE)"
    } else {
        ""
    };
    format!("-- {}{}", change.description(), destructive)
}

fn column_definition(column: &Column) -> String {
    let mut def = format!("{} {}", quote_ident(&column.name), column.full_type());
    if !column.is_nullable {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }
    def
}

fn alter_column(table: &QualifiedName, column: &str, alteration: &ColumnAlteration) -> String {
    let prefix = format!(
        "ALTER TABLE {} ALTER COLUMN {}",
        quote_qualified(table),
        quote_ident(column)
    );
    let mut statements = Vec::new();

    if alteration.type_changed {
        statements.push(format!("{prefix} TYPE {};", alteration.new_type));
    }
    if alteration.nullable_changed {
        if alteration.new_nullable {
            statements.push(format!("{prefix} DROP NOT NULL;"));
        } else {
            statements.push(format!("{prefix} SET NOT NULL;"));
        }
    }
    if alteration.default_changed {
        match &alteration.new_default {
            Some(default) => statements.push(format!("{prefix} SET DEFAULT {default};")),
            None => statements.push(format!("{prefix} DROP DEFAULT;")),
        }
    }

    statements.join("\n")
}

fn create_index(table: &QualifiedName, index: &Index) -> String {
    if !index.definition.is_empty() {
        return terminate(&index.definition);
    }

    let unique = if index.is_unique { "UNIQUE " } else { "" };
    let using = if index.method.is_empty() || index.method == "btree" {
        String::new()
    } else {
        format!(" USING {}", index.method)
    };
    let columns: Vec<String> = index.columns.iter().map(|c| quote_ident(c)).collect();

    format!(
        "CREATE {}INDEX {} ON {}{} ({});",
        unique,
        quote_ident(&index.name),
        quote_qualified(table),
        using,
        columns.join(", ")
    )
}

fn add_constraint(table: &QualifiedName, constraint: &Constraint) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} {};",
        quote_qualified(table),
        quote_ident(&constraint.name),
        constraint.definition
    )
}

/// A name in the same schema as `table`.
fn sibling(table: &QualifiedName, name: &str) -> QualifiedName {
    QualifiedName {
        schema: table.schema().map(str::to_string),
        name: name.to_string(),
    }
}

/// Append a statement terminator unless one is already present.
fn terminate(sql: &str) -> String {
    let sql = sql.trim_end();
    if sql.ends_with(';') {
        sql.to_string()
    } else {
        format!("{sql};")
    }
}

/// Quote an identifier only when PostgreSQL would otherwise fold or reject it.
pub fn quote_ident(name: &str) -> String {
    if is_simple_ident(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Quote each part of a qualified name.
pub fn quote_qualified(name: &QualifiedName) -> String {
    match name.schema() {
        Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&name.name)),
        None => quote_ident(&name.name),
    }
}

/// Quote a string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn is_simple_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return false;
    }
    !RESERVED_WORDS.contains(&name)
}
