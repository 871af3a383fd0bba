//! # csv2sqlite - delimited text to SQLite with type guessing
//!
//! Loads a CSV (or semicolon-separated, optionally gzipped) file into a SQLite
//! table, choosing `text`, `real` or `integer` for each column from a sample
//! of the data instead of an explicit schema.
//!
//! ## Modules
//!
//! - **source**: restartable row sources, delimiter sniffing, gzip input
//! - **infer**: the sampling type-inference engine
//! - **sqlite**: table declaration, value coercion and best-effort loading
//!
//! ## Quick Start
//!
//! ```rust
//! use csv2sqlite::{convert_with_connection, ConvertConfig, Source};
//! use rusqlite::Connection;
//!
//! # fn main() -> anyhow::Result<()> {
//! let source = Source::from_bytes("name,qty,price\napple,3,1.25\npear,5,0.80\n");
//! let mut conn = Connection::open_in_memory()?;
//!
//! let report = convert_with_connection(&source, &mut conn, &ConvertConfig::default())?;
//! assert_eq!(report.inserted, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ### Type inference only
//!
//! ```rust
//! use csv2sqlite::{infer_schema, ColumnType, ConvertConfig, Source};
//!
//! let source = Source::from_bytes("id;ratio\n1;0.5\n2;1,5\n");
//! let schema = infer_schema(&source, &ConvertConfig::default()).unwrap();
//! assert_eq!(schema.types(), vec![ColumnType::Integer, ColumnType::Real]);
//! ```

use rusqlite::Connection;
use std::path::Path;

pub mod cli;
pub mod error;
pub mod infer;
pub mod logging;
pub mod source;
pub mod sqlite;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{ConvertError, Result, RowError};
pub use infer::{infer_schema, infer_types, CandidateTypes, TypeInferrer};
pub use source::{Row, RowReader, Source};
pub use sqlite::{LoadReport, TableWriter};
pub use types::{CellValue, Column, ColumnType, ConvertConfig, TableSchema};

/// Main entry point: convert `source` into a table of the database at `db_path`.
///
/// The database file is created if it does not exist.
pub fn convert(
    source: &Source,
    db_path: impl AsRef<Path>,
    config: &ConvertConfig,
) -> Result<LoadReport> {
    let db_path = db_path.as_ref();
    let mut conn = Connection::open(db_path).map_err(|source| ConvertError::Database {
        resource: db_path.display().to_string(),
        source,
    })?;

    convert_with_connection(source, &mut conn, config)
}

/// Convert into a caller-owned connection.
///
/// Reads the source twice: once to infer the schema, once to load the rows.
pub fn convert_with_connection(
    source: &Source,
    conn: &mut Connection,
    config: &ConvertConfig,
) -> Result<LoadReport> {
    let delimiter = infer::resolve_delimiter(source, config)?;
    let config = ConvertConfig {
        delimiter: Some(delimiter),
        ..config.clone()
    };

    tracing::info!(
        source = %source.name(),
        table = %config.table_name,
        delimiter = %char::from(delimiter),
        "converting"
    );

    let schema = infer_schema(source, &config)?;
    let (_, rows) = source.open_table(delimiter, config.headers.as_deref())?;

    let mut writer = TableWriter::new(conn, config.table_name.clone());
    let created = writer.create_table(&schema)?;
    let mut report = writer.insert_rows(rows, &schema)?;
    report.created = created;

    Ok(report)
}
