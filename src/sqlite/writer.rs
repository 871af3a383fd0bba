use crate::error::{ConvertError, Result, RowError};
use crate::source::Row;
use crate::sqlite::coerce::coerce_row;
use crate::sqlite::{create_table_sql, insert_sql};
use crate::types::TableSchema;
use rusqlite::Connection;
use serde::Serialize;

/// Outcome of loading rows into a table
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub table: String,

    /// Whether this run created the table (false when it already existed)
    pub created: bool,

    /// Non-empty data rows read from the source
    pub rows_read: u64,

    pub inserted: u64,

    /// Rows left out of the table, in source order
    pub skipped: Vec<RowError>,
}

impl LoadReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Writes one table through a borrowed connection
pub struct TableWriter<'conn> {
    conn: &'conn mut Connection,
    table: String,
}

impl<'conn> TableWriter<'conn> {
    pub fn new(conn: &'conn mut Connection, table: impl Into<String>) -> Self {
        TableWriter {
            conn,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Whether a table or view of this name exists. SQLite compares names
    /// case-insensitively, so `Data` and `data` are the same table.
    pub fn table_exists(&self) -> Result<bool> {
        self.query_count(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE",
        )
        .map(|count| count > 0)
    }

    /// Number of columns of the existing table, 0 when there is none
    pub fn existing_column_count(&self) -> Result<usize> {
        self.query_count("SELECT COUNT(*) FROM pragma_table_info(?1)")
    }

    /// Create the table unless it already exists. Returns whether it was created.
    ///
    /// An existing table is reused as is. When the name is taken by some other
    /// object the create is abandoned with a warning and the rows are later
    /// reported as rejected inserts.
    pub fn create_table(&self, schema: &TableSchema) -> Result<bool> {
        if self.table_exists()? {
            let existing = self.existing_column_count()?;
            if existing != schema.len() {
                tracing::warn!(
                    table = %self.table,
                    existing,
                    columns = schema.len(),
                    "existing table has a different column count, rows will be rejected"
                );
            } else {
                tracing::info!(table = %self.table, "table already exists, appending rows");
            }
            return Ok(false);
        }

        let sql = create_table_sql(&self.table, schema);
        tracing::debug!(%sql, "creating table");
        if let Err(source) = self.conn.execute(&sql, []) {
            let taken = self.query_count(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = ?1 COLLATE NOCASE",
            )?;
            if taken > 0 {
                tracing::warn!(table = %self.table, error = %source, "table name is already in use");
                return Ok(false);
            }
            return Err(self.database_error(source));
        }

        tracing::info!(table = %self.table, columns = schema.len(), "created table");
        Ok(true)
    }

    /// Coerce and insert every row in a single transaction.
    ///
    /// Rows with the wrong field count, a cell that does not convert, or an
    /// insert the database rejects are skipped and recorded in the report.
    /// Errors reading the source abort the load and roll it back.
    pub fn insert_rows<I>(&mut self, rows: I, schema: &TableSchema) -> Result<LoadReport>
    where
        I: IntoIterator<Item = Result<Row>>,
    {
        let table = self.table.clone();
        let database_error = |source: rusqlite::Error| ConvertError::Database {
            resource: table.clone(),
            source,
        };

        let expected = schema.len();
        let types = schema.types();
        let mut report = LoadReport {
            table: table.clone(),
            ..LoadReport::default()
        };

        let tx = self.conn.transaction().map_err(database_error)?;
        {
            // A table that cannot take these rows rejects each one; the load still completes.
            let mut insert = tx
                .prepare_cached(&insert_sql(&table, expected))
                .map_err(|e| {
                    tracing::warn!(table = %table, error = %e, "cannot insert into table");
                    e.to_string()
                });

            for row in rows {
                let row = row?;
                report.rows_read += 1;

                if row.fields.len() != expected {
                    skip(
                        &mut report,
                        RowError::FieldCount {
                            row: row.number,
                            found: row.fields.len(),
                            expected,
                        },
                    );
                    continue;
                }

                let values = match coerce_row(&row.fields, &types) {
                    Ok(values) => values,
                    Err((idx, err)) => {
                        skip(
                            &mut report,
                            RowError::Conversion {
                                row: row.number,
                                column: schema.columns[idx].name.clone(),
                                value: err.value,
                                column_type: err.column_type,
                            },
                        );
                        continue;
                    }
                };

                let outcome = match &mut insert {
                    Ok(stmt) => stmt
                        .execute(rusqlite::params_from_iter(values.iter()))
                        .map(|_| ())
                        .map_err(|e| e.to_string()),
                    Err(message) => Err(message.clone()),
                };
                match outcome {
                    Ok(()) => report.inserted += 1,
                    Err(message) => skip(
                        &mut report,
                        RowError::Insert {
                            row: row.number,
                            message,
                        },
                    ),
                }
            }
        }
        tx.commit().map_err(database_error)?;

        tracing::info!(
            table = %table,
            inserted = report.inserted,
            skipped = report.skipped_count(),
            "loaded rows"
        );
        Ok(report)
    }

    fn query_count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(sql, [&self.table], |row| row.get(0))
            .map_err(|source| self.database_error(source))?;
        Ok(count as usize)
    }

    fn database_error(&self, source: rusqlite::Error) -> ConvertError {
        ConvertError::Database {
            resource: self.table.clone(),
            source,
        }
    }
}

fn skip(report: &mut LoadReport, err: RowError) {
    tracing::warn!(row = err.row(), "{}", err);
    report.skipped.push(err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;

    fn schema() -> TableSchema {
        let headers = vec!["name".to_string(), "qty".to_string(), "price".to_string()];
        TableSchema::new(
            &headers,
            &[ColumnType::Text, ColumnType::Integer, ColumnType::Real],
        )
    }

    fn row(number: u64, fields: &[&str]) -> Result<Row> {
        Ok(Row {
            number,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        })
    }

    #[test]
    fn test_create_then_reuse_table() {
        let mut conn = Connection::open_in_memory().unwrap();
        let writer = TableWriter::new(&mut conn, "items");

        assert!(!writer.table_exists().unwrap());
        assert!(writer.create_table(&schema()).unwrap());
        assert!(writer.table_exists().unwrap());
        assert!(!writer.create_table(&schema()).unwrap());
    }

    #[test]
    fn test_insert_skips_bad_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut writer = TableWriter::new(&mut conn, "items");
        writer.create_table(&schema()).unwrap();

        let rows = vec![
            row(1, &["apple", "3", "1,200.50"]),
            row(2, &["pear", "many", "2.0"]),
            row(3, &["plum", "1"]),
            row(4, &["fig", "", ""]),
        ];
        let report = writer.insert_rows(rows, &schema()).unwrap();

        assert_eq!(report.rows_read, 4);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped.len(), 2);
        assert!(matches!(
            &report.skipped[0],
            RowError::Conversion { row: 2, column, .. } if column == "qty"
        ));
        assert!(matches!(
            report.skipped[1],
            RowError::FieldCount { row: 3, found: 2, expected: 3 }
        ));

        let price: f64 = conn
            .query_row("SELECT price FROM items WHERE name = 'apple'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(price, 1200.5);

        let nulls: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM items WHERE qty IS NULL AND price IS NULL",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn test_source_error_rolls_back() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut writer = TableWriter::new(&mut conn, "items");
        writer.create_table(&schema()).unwrap();

        let rows = vec![
            row(1, &["apple", "3", "1.0"]),
            Err(ConvertError::EmptyInput {
                resource: "<test>".to_string(),
            }),
        ];
        assert!(writer.insert_rows(rows, &schema()).is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_existing_table_name_is_case_insensitive() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE Items (name text, qty integer, price real)", [])
            .unwrap();

        let mut writer = TableWriter::new(&mut conn, "items");
        assert!(writer.table_exists().unwrap());
        assert!(!writer.create_table(&schema()).unwrap());

        let report = writer
            .insert_rows(vec![row(1, &["apple", "3", "1.0"])], &schema())
            .unwrap();
        assert_eq!(report.inserted, 1);
    }

    #[test]
    fn test_existing_table_with_other_width_rejects_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE items (name text, qty integer)", [])
            .unwrap();

        let mut writer = TableWriter::new(&mut conn, "items");
        assert_eq!(writer.existing_column_count().unwrap(), 2);
        assert!(!writer.create_table(&schema()).unwrap());

        let rows = vec![row(1, &["apple", "3", "1.0"]), row(2, &["pear", "5", "2.0"])];
        let report = writer.insert_rows(rows, &schema()).unwrap();
        assert_eq!(report.rows_read, 2);
        assert_eq!(report.inserted, 0);
        assert_eq!(report.skipped.len(), 2);
        assert!(matches!(report.skipped[1], RowError::Insert { row: 2, .. }));
    }

    #[test]
    fn test_name_taken_by_index_is_not_fatal() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE other (x text); CREATE INDEX items ON other (x);")
            .unwrap();

        let mut writer = TableWriter::new(&mut conn, "items");
        assert!(!writer.table_exists().unwrap());
        assert!(!writer.create_table(&schema()).unwrap());

        let report = writer
            .insert_rows(vec![row(1, &["apple", "3", "1.0"])], &schema())
            .unwrap();
        assert_eq!(report.inserted, 0);
        assert!(matches!(report.skipped[0], RowError::Insert { row: 1, .. }));
    }
}
