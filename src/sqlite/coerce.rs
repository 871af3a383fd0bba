use crate::types::{CellValue, ColumnType};
use thiserror::Error;

/// A cell that could not be converted to its column's type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to convert value '{value}' to type '{column_type}'")]
pub struct CoerceError {
    pub value: String,
    pub column_type: ColumnType,
}

/// Convert raw cell text to the native value for `column_type`.
///
/// Empty cells are null. Reals have grouping commas removed before parsing;
/// integers are parsed as-is; text passes through unchanged.
pub fn coerce(cell: &str, column_type: ColumnType) -> Result<CellValue, CoerceError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(CellValue::Null);
    }

    let failed = || CoerceError {
        value: cell.to_string(),
        column_type,
    };

    match column_type {
        ColumnType::Text => Ok(CellValue::Text(cell.to_string())),
        ColumnType::Real => cell
            .replace(',', "")
            .parse::<f64>()
            .map(CellValue::Real)
            .map_err(|_| failed()),
        ColumnType::Integer => cell
            .parse::<i64>()
            .map(CellValue::Integer)
            .map_err(|_| failed()),
    }
}

/// Convert a whole row. On failure, returns the offending column index.
pub fn coerce_row(
    fields: &[String],
    types: &[ColumnType],
) -> Result<Vec<CellValue>, (usize, CoerceError)> {
    fields
        .iter()
        .zip(types.iter())
        .enumerate()
        .map(|(idx, (cell, column_type))| coerce(cell, *column_type).map_err(|e| (idx, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_null_for_every_type() {
        for column_type in [ColumnType::Text, ColumnType::Real, ColumnType::Integer] {
            assert_eq!(coerce("", column_type).unwrap(), CellValue::Null);
        }
    }

    #[test]
    fn test_real_strips_grouping_separators() {
        assert_eq!(
            coerce("1,234", ColumnType::Real).unwrap(),
            CellValue::Real(1234.0)
        );
        assert_eq!(coerce("2.5", ColumnType::Real).unwrap(), CellValue::Real(2.5));
    }

    #[test]
    fn test_integer_and_text() {
        assert_eq!(
            coerce("-42", ColumnType::Integer).unwrap(),
            CellValue::Integer(-42)
        );
        assert_eq!(
            coerce("a,b", ColumnType::Text).unwrap(),
            CellValue::Text("a,b".to_string())
        );
    }

    #[test]
    fn test_conversion_failures() {
        let err = coerce("1.5", ColumnType::Integer).unwrap_err();
        assert_eq!(err.value, "1.5");
        assert_eq!(err.column_type, ColumnType::Integer);

        assert!(coerce("abc", ColumnType::Real).is_err());
    }

    #[test]
    fn test_coerce_row_reports_column() {
        let fields = vec!["1".to_string(), "x".to_string()];
        let types = [ColumnType::Integer, ColumnType::Integer];
        let (idx, err) = coerce_row(&fields, &types).unwrap_err();
        assert_eq!(idx, 1);
        assert_eq!(err.value, "x");
    }
}
