//! Tests against a real PostgreSQL server.
//!
//! Set `PGBRANCH_TEST_DATABASE_URL` to run them; they are skipped otherwise.
//! Each test works inside its own scratch schema and drops it afterwards.

use pgbranch_migrate::{
    Applier, Change, ChangeSet, IntrospectionConfig, diff, extract_schema, order_changes,
};
use pgbranch_postgres::{PgIntrospector, PgPool};
use pgbranch_schema::{Column, QualifiedName, Table};

fn database_url() -> Option<String> {
    std::env::var("PGBRANCH_TEST_DATABASE_URL").ok()
}

async fn pool() -> Option<PgPool> {
    let url = database_url()?;
    let pool = PgPool::from_url(&url).ok()?;
    if !pool.is_healthy().await {
        eprintln!("Skipping live test: database not reachable");
        return None;
    }
    Some(pool)
}

#[tokio::test]
async fn test_introspect_scratch_schema() {
    let Some(pool) = pool().await else { return };
    let conn = pool.get().await.unwrap();

    conn.batch_execute(
        r#"
        DROP SCHEMA IF EXISTS pgbranch_it_introspect CASCADE;
        CREATE SCHEMA pgbranch_it_introspect;
        CREATE TYPE pgbranch_it_introspect.mood AS ENUM ('sad', 'ok', 'happy');
        CREATE TABLE pgbranch_it_introspect.it_accounts (
            id serial PRIMARY KEY,
            email varchar(255) NOT NULL,
            tags text[],
            mood pgbranch_it_introspect.mood
        );
        CREATE TABLE pgbranch_it_introspect.it_sessions (
            id serial PRIMARY KEY,
            account_id integer NOT NULL
                REFERENCES pgbranch_it_introspect.it_accounts(id) ON DELETE CASCADE
        );
        CREATE INDEX it_sessions_account_idx ON pgbranch_it_introspect.it_sessions (account_id);
        "#,
    )
    .await
    .unwrap();

    let config = IntrospectionConfig::new()
        .include_tables(vec!["it_accounts".into(), "it_sessions".into()])
        .include_functions(false);
    let introspector = PgIntrospector::new(conn);
    let schema = extract_schema(&introspector, &config, "it").await.unwrap();

    let accounts = &schema.tables["it_accounts"];
    assert_eq!(accounts.schema, "pgbranch_it_introspect");
    assert_eq!(accounts.columns["email"].full_type(), "varchar(255)");
    assert!(!accounts.columns["email"].is_nullable);
    assert!(accounts.columns["tags"].is_array);
    assert_eq!(accounts.columns["tags"].full_type(), "text[]");
    assert_eq!(accounts.columns["mood"].full_type(), "mood");
    assert!(!accounts.columns["mood"].is_array);
    assert!(accounts.primary_key().is_some());

    let sessions = &schema.tables["it_sessions"];
    let fk = sessions
        .constraints
        .values()
        .find(|c| c.is_foreign_key())
        .unwrap();
    assert_eq!(fk.ref_table.as_deref(), Some("it_accounts"));
    assert_eq!(fk.ref_columns, ["id"]);
    assert_eq!(fk.on_delete.as_deref(), Some("CASCADE"));
    assert_eq!(sessions.indexes["it_sessions_account_idx"].columns, ["account_id"]);

    let mood = schema.get_enum("mood").unwrap();
    assert_eq!(mood.values, ["sad", "ok", "happy"]);

    let conn = introspector.into_inner();
    conn.batch_execute("DROP SCHEMA pgbranch_it_introspect CASCADE")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_apply_and_reintrospect() {
    let Some(pool) = pool().await else { return };
    let conn = pool.get().await.unwrap();
    conn.batch_execute(
        "DROP SCHEMA IF EXISTS pgbranch_it_apply CASCADE; CREATE SCHEMA pgbranch_it_apply;",
    )
    .await
    .unwrap();

    let table = Table::new("it_widgets")
        .in_schema("pgbranch_it_apply")
        .with_column(Column::new("id", "integer").nullable(false))
        .with_column(Column::new("label", "text"));
    let cs: ChangeSet = vec![
        Change::CreateTable { table },
        Change::AddColumn {
            table: QualifiedName::qualified("pgbranch_it_apply", "it_widgets"),
            column: Column::new("weight", "numeric").numeric(10, Some(2)),
        },
    ]
    .into_iter()
    .collect();

    let mut applier = Applier::new(conn);
    let result = applier.apply(&order_changes(cs)).await.unwrap();
    assert!(result.is_success());
    assert_eq!(result.applied.len(), 2);

    let config = IntrospectionConfig::new()
        .include_tables(vec!["it_widgets".into()])
        .include_enums(false)
        .include_functions(false);
    let introspector = PgIntrospector::new(applier.into_executor());
    let schema = extract_schema(&introspector, &config, "after").await.unwrap();

    let widgets = &schema.tables["it_widgets"];
    assert_eq!(widgets.columns["weight"].full_type(), "numeric(10,2)");

    // A second diff against what was applied finds nothing left to do.
    let expected = schema.clone();
    assert!(diff(&schema, &expected).is_empty());

    introspector
        .into_inner()
        .batch_execute("DROP SCHEMA pgbranch_it_apply CASCADE")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_apply_persists_nothing() {
    let Some(pool) = pool().await else { return };
    let conn = pool.get().await.unwrap();
    conn.batch_execute(
        "DROP SCHEMA IF EXISTS pgbranch_it_rollback CASCADE; CREATE SCHEMA pgbranch_it_rollback;",
    )
    .await
    .unwrap();

    let table = |name: &str| {
        Table::new(name)
            .in_schema("pgbranch_it_rollback")
            .with_column(Column::new("id", "integer").nullable(false))
    };
    // The second change targets a table that does not exist.
    let cs: ChangeSet = vec![
        Change::CreateTable {
            table: table("it_first"),
        },
        Change::AddColumn {
            table: QualifiedName::qualified("pgbranch_it_rollback", "it_missing"),
            column: Column::new("label", "text"),
        },
        Change::CreateTable {
            table: table("it_third"),
        },
    ]
    .into_iter()
    .collect();

    let mut applier = Applier::new(conn);
    let err = applier.apply(&cs).await.unwrap_err();
    let result = err.apply_result().unwrap();
    assert_eq!(result.applied.len(), 1);
    assert_eq!(result.failed.len(), 1);
    assert!(result.failed[0].sql.contains("it_missing"));

    let config = IntrospectionConfig::new()
        .include_tables(vec!["it_first".into(), "it_third".into()])
        .include_enums(false)
        .include_functions(false);
    let introspector = PgIntrospector::new(applier.into_executor());
    let schema = extract_schema(&introspector, &config, "after").await.unwrap();
    assert!(schema.tables.is_empty());

    introspector
        .into_inner()
        .batch_execute("DROP SCHEMA pgbranch_it_rollback CASCADE")
        .await
        .unwrap();
}
