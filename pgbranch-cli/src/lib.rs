//! pgbranch CLI - compare and merge PostgreSQL schemas.
//!
//! This crate provides the `pgbranch` binary: schema diffs between databases
//! or snapshot files, merges that apply or write the resulting migration, and
//! snapshot capture.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod render;
pub mod source;
