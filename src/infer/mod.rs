//! Column type inference
//!
//! Samples a bounded prefix of the data rows, scores each column against the
//! candidate types and resolves exactly one type per column. Inference never
//! fails on cell content: a cell that parses as nothing but text only counts
//! toward `text`.

pub mod builder;
pub mod candidates;

pub use builder::TypeInferrer;
pub use candidates::{normalize_numeric, Candidate, CandidateTypes, ParsePredicate};

use crate::error::{ConvertError, Result};
use crate::source::{Row, Source};
use crate::types::{ColumnType, ConvertConfig, TableSchema};
use std::convert::Infallible;

/// Infer one type per column from an iterator of rows.
///
/// At most `max_sample_size` rows are read (0 reads until the threshold is met
/// or the rows run out).
pub fn infer_types<I, R, S>(
    column_count: usize,
    rows: I,
    candidates: &CandidateTypes,
    max_sample_size: usize,
    sample_threshold: usize,
) -> Vec<ColumnType>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut inferrer = TypeInferrer::new(column_count, candidates.clone(), sample_threshold);
    sample(&mut inferrer, rows.into_iter().map(Ok), max_sample_size)
        .unwrap_or_else(|never: Infallible| match never {});
    inferrer.build()
}

// Feed rows until the window is exhausted or every column is saturated.
fn sample<I, R, S, E>(
    inferrer: &mut TypeInferrer,
    rows: I,
    max_sample_size: usize,
) -> std::result::Result<(), E>
where
    I: Iterator<Item = std::result::Result<R, E>>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    for row in rows {
        if inferrer.add_row(row?.as_ref()) {
            break;
        }
        if max_sample_size > 0 && inferrer.rows_seen() >= max_sample_size {
            break;
        }
    }
    Ok(())
}

/// Resolve the delimiter for `source`: configured, or sniffed from its first line
pub fn resolve_delimiter(source: &Source, config: &ConvertConfig) -> Result<u8> {
    match config.delimiter {
        Some(delimiter) => Ok(delimiter),
        None => source.detect_delimiter(),
    }
}

/// Run the sampling pass over `source` and build its table schema.
///
/// Types from `config.column_types` replace inferred ones position by position.
pub fn infer_schema(source: &Source, config: &ConvertConfig) -> Result<TableSchema> {
    let delimiter = resolve_delimiter(source, config)?;
    let (headers, rows) = source.open_table(delimiter, config.headers.as_deref())?;

    let mut inferrer = TypeInferrer::new(
        headers.len(),
        config.candidates.clone(),
        config.sample_threshold,
    );
    sample(
        &mut inferrer,
        rows.map(|row| row.map(|Row { fields, .. }| fields)),
        config.max_sample_size,
    )?;

    tracing::debug!(
        source = %source.name(),
        rows = inferrer.rows_seen(),
        samples = ?inferrer.sample_counts(),
        "sampled rows for type inference"
    );

    let types = apply_column_types(inferrer.build(), &config.column_types)?;
    let schema = TableSchema::new(&headers, &types);

    for column in &schema.columns {
        tracing::debug!(column = %column.name, column_type = %column.column_type, "resolved column type");
    }

    Ok(schema)
}

/// Overlay pre-specified types onto inferred ones
pub fn apply_column_types(
    mut inferred: Vec<ColumnType>,
    column_types: &[Option<ColumnType>],
) -> Result<Vec<ColumnType>> {
    if column_types.len() > inferred.len() {
        return Err(ConvertError::TypeCountMismatch {
            supplied: column_types.len(),
            columns: inferred.len(),
        });
    }

    for (slot, preset) in inferred.iter_mut().zip(column_types) {
        if let Some(column_type) = preset {
            *slot = *column_type;
        }
    }
    Ok(inferred)
}
