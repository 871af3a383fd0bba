use crate::error::ConvertError;
use crate::infer::CandidateTypes;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage type a column resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Real,
    Integer,
}

impl ColumnType {
    /// The type name used in the table declaration
    pub fn as_sql(self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Real => "real",
            ColumnType::Integer => "integer",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ColumnType {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ColumnType::Text),
            "real" => Ok(ColumnType::Real),
            "integer" => Ok(ColumnType::Integer),
            _ => Err(ConvertError::UnknownColumnType {
                value: s.to_string(),
            }),
        }
    }
}

/// A cell after coercion to its column's type
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Null => ToSqlOutput::Owned(Value::Null),
            CellValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            CellValue::Real(r) => ToSqlOutput::Owned(Value::Real(*r)),
            CellValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// A named, positioned column with its resolved type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub position: usize,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Resolved schema for one table: one column per header, in header order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<Column>,
}

impl TableSchema {
    /// Pair headers with types positionally. Both slices must have the same length.
    pub fn new(headers: &[String], types: &[ColumnType]) -> Self {
        let columns = headers
            .iter()
            .zip(types.iter())
            .enumerate()
            .map(|(position, (name, column_type))| Column {
                name: name.clone(),
                position,
                column_type: *column_type,
            })
            .collect();

        TableSchema { columns }
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(|c| c.column_type).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Configuration for a conversion run
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Destination table name
    pub table_name: String,

    /// Maximum number of data rows read while inferring types (0 = no limit)
    pub max_sample_size: usize,

    /// Non-null samples per column after which sampling may stop early
    pub sample_threshold: usize,

    /// Field delimiter; sniffed from the first line when `None`
    pub delimiter: Option<u8>,

    /// Externally supplied headers. When set, every record of the source is data.
    pub headers: Option<Vec<String>>,

    /// Candidate types in tie-break order (later entries win ties)
    pub candidates: CandidateTypes,

    /// Pre-specified types by position; `None` entries and missing positions are inferred
    pub column_types: Vec<Option<ColumnType>>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            table_name: String::from("data"),
            max_sample_size: 100,
            sample_threshold: 100,
            delimiter: None,
            headers: None,
            candidates: CandidateTypes::default(),
            column_types: vec![],
        }
    }
}

/// Parse a comma-separated type list such as `text,,integer`.
///
/// Blank entries and `auto` leave that position to inference.
pub fn parse_column_types(list: &str) -> Result<Vec<Option<ColumnType>>, ConvertError> {
    list.split(',')
        .map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() || entry.eq_ignore_ascii_case("auto") {
                Ok(None)
            } else {
                entry.parse().map(Some)
            }
        })
        .collect()
}
