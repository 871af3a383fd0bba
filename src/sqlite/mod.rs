//! SQLite table materialization
//!
//! Turns a resolved schema into a table declaration and loads coerced rows.
//! Loading is best-effort: a row that fails conversion or insertion is
//! reported and skipped, and the load carries on.

pub mod coerce;
pub mod writer;

pub use coerce::{coerce, coerce_row, CoerceError};
pub use writer::{LoadReport, TableWriter};

use crate::types::TableSchema;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static NON_IDENTIFIER_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render the table declaration, e.g. `CREATE TABLE "data" ("a" text,"b" integer)`
pub fn create_table_sql(table: &str, schema: &TableSchema) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_identifier(&c.name), c.column_type.as_sql()))
        .collect::<Vec<_>>()
        .join(",");

    format!("CREATE TABLE {} ({})", quote_identifier(table), columns)
}

/// Positional insert with one placeholder per column
pub fn insert_sql(table: &str, column_count: usize) -> String {
    let placeholders = vec!["?"; column_count].join(",");
    format!("INSERT INTO {} VALUES ({})", quote_identifier(table), placeholders)
}

/// Reduce an arbitrary name to `[A-Za-z0-9_]`, never empty, never starting with a digit
pub fn sanitize_table_name(name: &str) -> String {
    let cleaned = NON_IDENTIFIER_RUN.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches('_');

    if cleaned.is_empty() {
        return String::from("data");
    }
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{}", cleaned);
    }
    cleaned.to_string()
}

/// Table name from an input file name: `sales-2024.csv.gz` becomes `sales_2024`
pub fn table_name_from_path(path: &Path) -> String {
    let mut stem = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if let Some(without_gz) = stem.strip_suffix(".gz") {
        stem = without_gz;
    }
    if let Some((base, _ext)) = stem.rsplit_once('.') {
        if !base.is_empty() {
            stem = base;
        }
    }

    sanitize_table_name(stem)
}
