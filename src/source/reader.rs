use crate::error::{ConvertError, Result};
use crate::source::dialect::SkipInitialSpace;
use csv::{ByteRecord, ReaderBuilder, Trim};
use std::io::Read;

/// One data record: its 1-based position after the header and its trimmed fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub number: u64,
    pub fields: Vec<String>,
}

/// Lazy reader of trimmed text rows over a delimited stream
pub struct RowReader<R: Read> {
    reader: csv::Reader<SkipInitialSpace<R>>,
    record: ByteRecord,
    resource: String,
    rows_read: u64,
}

impl<R: Read> RowReader<R> {
    pub fn new(input: R, delimiter: u8, resource: impl Into<String>) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(SkipInitialSpace::new(input, delimiter));

        RowReader {
            reader,
            record: ByteRecord::new(),
            resource: resource.into(),
            rows_read: 0,
        }
    }

    /// Consume the header record.
    ///
    /// Fails with `EmptyInput` when the stream holds no record at all.
    pub fn headers(&mut self) -> Result<Vec<String>> {
        while self.read_record()? {
            if self.record.is_empty() {
                continue;
            }

            let mut headers = decode_fields(&self.record);
            if let Some(first) = headers.first_mut() {
                if let Some(stripped) = first.strip_prefix('\u{feff}') {
                    *first = stripped.trim().to_string();
                }
            }
            return Ok(headers);
        }

        Err(ConvertError::EmptyInput {
            resource: self.resource.clone(),
        })
    }

    /// Next non-empty data row, or `None` at end of stream
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        while self.read_record()? {
            self.rows_read += 1;
            if self.record.is_empty() {
                continue;
            }
            return Ok(Some(Row {
                number: self.rows_read,
                fields: decode_fields(&self.record),
            }));
        }
        Ok(None)
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    fn read_record(&mut self) -> Result<bool> {
        self.reader
            .read_byte_record(&mut self.record)
            .map_err(|source| ConvertError::Csv {
                resource: self.resource.clone(),
                source,
            })
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

// Invalid UTF-8 is replaced rather than rejected so a stray byte never drops a row.
fn decode_fields(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(input: &str, delimiter: u8) -> RowReader<&[u8]> {
        RowReader::new(input.as_bytes(), delimiter, "<test>")
    }

    #[test]
    fn test_headers_are_trimmed() {
        let mut rows = reader("col_a    , col_b\n", b',');
        assert_eq!(rows.headers().unwrap(), vec!["col_a", "col_b"]);
        assert!(rows.next_row().unwrap().is_none());
    }

    #[test]
    fn test_rows_are_numbered_after_header() {
        let mut rows = reader("a,b\n1,x\n2,y\n", b',');
        rows.headers().unwrap();

        let all: Vec<Row> = rows.map(|r| r.unwrap()).collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].number, 1);
        assert_eq!(all[1].fields, vec!["2", "y"]);
    }

    #[test]
    fn test_cells_are_trimmed_and_quotes_removed() {
        let mut rows = reader("name;note\n  abc ; \"x;y\"\n", b';');
        rows.headers().unwrap();

        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row.fields, vec!["abc", "x;y"]);
    }

    #[test]
    fn test_quoted_field_after_space_keeps_delimiter() {
        let mut rows = reader("name, note, qty\nSmith, \"Paris, France\", 3\n", b',');
        assert_eq!(rows.headers().unwrap(), vec!["name", "note", "qty"]);

        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row.fields, vec!["Smith", "Paris, France", "3"]);
    }

    #[test]
    fn test_bom_then_space_before_first_header() {
        let mut rows = reader("\u{feff} id , name\n", b',');
        assert_eq!(rows.headers().unwrap(), vec!["id", "name"]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut rows = reader("a\n\n1\n\n2\n", b',');
        rows.headers().unwrap();

        let fields: Vec<Vec<String>> = rows.map(|r| r.unwrap().fields).collect();
        assert_eq!(fields, vec![vec!["1".to_string()], vec!["2".to_string()]]);
    }

    #[test]
    fn test_empty_input_has_no_headers() {
        let mut rows = reader("", b',');
        let err = rows.headers().unwrap_err();
        assert!(matches!(err, ConvertError::EmptyInput { .. }));
    }

    #[test]
    fn test_bom_is_stripped_from_first_header() {
        let mut rows = reader("\u{feff}id,name\n", b',');
        assert_eq!(rows.headers().unwrap(), vec!["id", "name"]);
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let mut rows = reader("a,b,c\n1,2\n", b',');
        rows.headers().unwrap();
        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row.fields.len(), 2);
    }
}
