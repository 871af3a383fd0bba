//! Error types for conversion runs.
//!
//! `ConvertError` is fatal and aborts the run. `RowError` describes a single
//! data row that was skipped while the rest of the load continued.

use crate::types::ColumnType;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input file does not exist.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Input could not be opened or read.
    #[error("failed to read {resource}: {source}")]
    Read {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    /// The delimited reader failed mid-stream (I/O or decompression).
    #[error("failed to parse delimited input {resource}: {source}")]
    Csv {
        resource: String,
        #[source]
        source: csv::Error,
    },

    /// No header record could be read.
    #[error("input is empty, no header row in {resource}")]
    EmptyInput { resource: String },

    /// A type name other than text, real or integer.
    #[error("unknown column type '{value}' (expected text, real or integer)")]
    UnknownColumnType { value: String },

    /// More pre-specified types than there are columns.
    #[error("{supplied} column types supplied but the header has {columns} columns")]
    TypeCountMismatch { supplied: usize, columns: usize },

    /// Database open, create or commit failure.
    #[error("database error on {resource}: {source}")]
    Database {
        resource: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// A data row that was skipped during the load.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowError {
    #[error("unable to convert value '{value}' to type '{column_type}' on row {row}")]
    Conversion {
        row: u64,
        column: String,
        value: String,
        column_type: ColumnType,
    },

    #[error("row {row} has {found} fields, expected {expected}")]
    FieldCount {
        row: u64,
        found: usize,
        expected: usize,
    },

    #[error("error on row {row}: {message}")]
    Insert { row: u64, message: String },
}

impl RowError {
    pub fn row(&self) -> u64 {
        match self {
            RowError::Conversion { row, .. }
            | RowError::FieldCount { row, .. }
            | RowError::Insert { row, .. } => *row,
        }
    }
}
