//! Integration tests for the pgbranch CLI, driven by snapshot files.

use assert_cmd::Command;
use pgbranch_schema::{Column, Enum, Index, Schema, Table, save_snapshot};
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the pgbranch binary, isolated from the caller's environment
#[allow(deprecated)]
fn pgbranch_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pgbranch").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("PGBRANCH_DATABASE_URL")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn main_schema() -> Schema {
    Schema::new("main")
        .with_enum(Enum::new("status", ["active"]))
        .with_table(
            Table::new("users")
                .with_column(Column::new("id", "integer").nullable(false))
                .with_column(Column::new("legacy", "text")),
        )
}

fn feature_schema() -> Schema {
    Schema::new("feature")
        .with_enum(Enum::new("status", ["active", "banned"]))
        .with_table(
            Table::new("users")
                .with_column(Column::new("id", "integer").nullable(false))
                .with_column(Column::new("email", "text"))
                .with_index(Index::new("users_email_idx", "users", ["email"]).unique()),
        )
        .with_table(Table::new("posts").with_column(Column::new("id", "integer").nullable(false)))
}

/// Write main.json and feature.json into a fresh directory.
fn snapshots() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let main = dir.path().join("main.json");
    let feature = dir.path().join("feature.json");
    save_snapshot(&main_schema(), &main).unwrap();
    save_snapshot(&feature_schema(), &feature).unwrap();
    (dir, main, feature)
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    pgbranch_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compare and merge PostgreSQL schemas"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("snapshot"));
}

#[test]
fn test_diff_identical_snapshots() {
    let (dir, main, _) = snapshots();
    pgbranch_cmd(&dir)
        .args(["diff", "main.json", "main.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No schema differences between"));
    assert!(main.exists());
}

#[test]
fn test_diff_full_listing() {
    let (dir, _, _) = snapshots();
    pgbranch_cmd(&dir)
        .args(["diff", "main.json", "feature.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Comparing 'main.json' → 'feature.json'"))
        .stdout(predicate::str::contains("+ TABLE posts\n    id integer NOT NULL"))
        .stdout(predicate::str::contains("~ TABLE users"))
        .stdout(predicate::str::contains("  + COLUMN email text"))
        .stdout(predicate::str::contains("  - COLUMN legacy ⚠ DESTRUCTIVE"))
        .stdout(predicate::str::contains("+ UNIQUE INDEX users_email_idx on users(email)"))
        .stdout(predicate::str::contains("+ ENUM VALUE 'banned' to status"))
        .stdout(predicate::str::contains("⚠ 1 destructive change(s)"));
}

#[test]
fn test_diff_stat() {
    let (dir, _, _) = snapshots();
    pgbranch_cmd(&dir)
        .args(["diff", "main.json", "feature.json", "--stat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary:"))
        .stdout(predicate::str::contains("+ 4 addition(s)"))
        .stdout(predicate::str::contains("- 1 deletion(s)"))
        .stdout(predicate::str::contains("TABLE").not());
}

#[test]
fn test_diff_sql() {
    let (dir, _, _) = snapshots();
    pgbranch_cmd(&dir)
        .args(["diff", "main.json", "feature.json", "--sql"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ALTER TYPE status ADD VALUE 'banned' AFTER 'active';"))
        .stdout(predicate::str::contains("CREATE TABLE posts ("))
        .stdout(predicate::str::contains("ALTER TABLE users DROP COLUMN legacy;"));
}

#[test]
fn test_diff_json_report() {
    let (dir, _, _) = snapshots();
    let output = pgbranch_cmd(&dir)
        .args(["diff", "main.json", "feature.json", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stat"]["additions"], 4);
    assert_eq!(report["stat"]["destructive"], 1);
    assert_eq!(report["summary"]["ADD_ENUM_VALUE"], 1);
    assert_eq!(report["validation"]["warnings"].as_array().unwrap().len(), 1);
    assert!(report["sql"].as_array().unwrap().len() >= 4);
}

#[test]
fn test_diff_missing_snapshot() {
    let dir = TempDir::new().unwrap();
    pgbranch_cmd(&dir)
        .args(["diff", "nope.json", "other.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn test_merge_dry_run() {
    let (dir, _, _) = snapshots();
    pgbranch_cmd(&dir)
        .args(["merge", "feature.json", "main.json", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changes to merge from 'feature.json' → 'main.json'"))
        .stdout(predicate::str::contains("Warnings:"))
        .stdout(predicate::str::contains("--- Dry Run: SQL that would be executed ---"))
        .stdout(predicate::str::contains("-- Drop column users.legacy"));
}

#[test]
fn test_merge_migration_file() {
    let (dir, _, _) = snapshots();
    pgbranch_cmd(&dir)
        .args([
            "merge",
            "feature.json",
            "main.json",
            "--migration-file",
            "--migration-dir",
            "db/migrations",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Migration file created"));

    let files: Vec<_> = std::fs::read_dir(dir.path().join("db/migrations"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("_merge_feature.sql"));

    let content = std::fs::read_to_string(dir.path().join("db/migrations").join(&files[0])).unwrap();
    assert!(content.contains("-- Description: Merge feature into main"));
    assert!(content.contains("BEGIN;"));
    assert!(content.trim_end().ends_with("COMMIT;"));
}

#[test]
fn test_merge_migration_dir_from_config() {
    let (dir, _, _) = snapshots();
    std::fs::write(
        dir.path().join("pgbranch.toml"),
        "[migrations]\ndirectory = \"sql\"\ninclude_comments = false\n",
    )
    .unwrap();

    pgbranch_cmd(&dir)
        .args(["merge", "feature.json", "main.json", "--migration-file"])
        .assert()
        .success();

    let entry = std::fs::read_dir(dir.path().join("sql"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    let content = std::fs::read_to_string(entry.path()).unwrap();
    assert!(!content.contains("-- Drop column users.legacy"));
    assert!(content.contains("ALTER TABLE users DROP COLUMN legacy;"));
}

#[test]
fn test_merge_into_snapshot_requires_dry_run() {
    let (dir, _, _) = snapshots();
    pgbranch_cmd(&dir)
        .args(["merge", "feature.json", "main.json", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot apply changes to snapshot file"));
}

#[test]
fn test_merge_nothing_to_do() {
    let (dir, _, _) = snapshots();
    pgbranch_cmd(&dir)
        .args(["merge", "main.json", "main.json", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No schema differences"));
}

#[test]
fn test_snapshot_copies_a_snapshot() {
    let (dir, _, _) = snapshots();
    pgbranch_cmd(&dir)
        .args(["snapshot", "feature.json", "--output", "out/copy.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 tables, 1 enums, 0 functions"));

    let copy = pgbranch_schema::load_snapshot(dir.path().join("out/copy.json")).unwrap();
    assert_eq!(copy, feature_schema());
}

#[test]
fn test_invalid_config_file() {
    let (dir, _, _) = snapshots();
    std::fs::write(dir.path().join("pgbranch.toml"), "[database\n").unwrap();
    pgbranch_cmd(&dir)
        .args(["diff", "main.json", "feature.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse TOML"));
}
