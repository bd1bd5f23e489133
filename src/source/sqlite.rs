//! Relational backing source over SQLite.
//!
//! The configured query must return either two columns `(id, name)` or three
//! columns `(id, taxon, name)`. Rows are consumed sequentially.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};

use super::{EntitySource, SourceRow};
use crate::error::{GazetteerError, Result};

/// A SQLite database answering a name query.
#[derive(Clone, Debug)]
pub struct SqliteSource {
    path: PathBuf,
    query: String,
    timeout: Duration,
}

impl SqliteSource {
    pub fn new<P: AsRef<Path>, S: Into<String>>(path: P, query: S) -> Self {
        SqliteSource {
            path: path.as_ref().to_path_buf(),
            query: query.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// How long to wait on a locked database.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn text_column(row: &Row<'_>, index: usize, what: &str, row_num: usize) -> Result<String> {
    let value = match row.get_ref(index)? {
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Null => String::new(),
        ValueRef::Blob(_) => {
            return Err(GazetteerError::source(format!(
                "Malformed row {row_num}: unsupported BLOB column for {what}"
            )));
        }
    };
    if value.is_empty() {
        return Err(GazetteerError::source(format!(
            "Malformed row {row_num}: missing {what}"
        )));
    }
    Ok(value)
}

/// Like [`text_column`], but a whitespace-only value is also missing.
fn key_column(row: &Row<'_>, index: usize, what: &str, row_num: usize) -> Result<String> {
    let value = text_column(row, index, what, row_num)?;
    if value.trim().is_empty() {
        return Err(GazetteerError::source(format!(
            "Malformed row {row_num}: missing {what}"
        )));
    }
    Ok(value)
}

impl EntitySource for SqliteSource {
    fn read_rows(&mut self) -> Result<Vec<SourceRow>> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| {
                GazetteerError::source(format!(
                    "Failed to open database '{}': {e}",
                    self.path.display()
                ))
            })?;
        conn.busy_timeout(self.timeout)?;

        let mut stmt = conn.prepare(&self.query)?;
        let columns = stmt.column_count();
        if columns != 2 && columns != 3 {
            return Err(GazetteerError::source(format!(
                "Query must return 2 (id, name) or 3 (id, taxon, name) columns, got {columns}"
            )));
        }

        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let row_num = result.len() + 1;
            let id = key_column(row, 0, "id", row_num)?;
            let name = text_column(row, columns - 1, "name", row_num)?;
            let source_row = if columns == 3 {
                SourceRow::with_taxon(id, key_column(row, 1, "taxon", row_num)?, name)
            } else {
                SourceRow::new(id, name)
            };
            result.push(source_row);
        }
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database(statements: &str) -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        let conn = Connection::open(dir.path().join("genes.db")).unwrap();
        conn.execute_batch(statements).unwrap();
        dir
    }

    #[test]
    fn test_two_column_query() {
        let dir = database(
            "CREATE TABLE names (id TEXT, name TEXT);
             INSERT INTO names VALUES ('G1', 'BRCA1'), ('G2', 'BRCA2');",
        );
        let mut source = SqliteSource::new(
            dir.path().join("genes.db"),
            "SELECT id, name FROM names ORDER BY id",
        );
        let rows = source.read_rows().unwrap();
        assert_eq!(
            rows,
            vec![SourceRow::new("G1", "BRCA1"), SourceRow::new("G2", "BRCA2")]
        );
    }

    #[test]
    fn test_three_column_query_with_integer_taxon() {
        let dir = database(
            "CREATE TABLE genes (id TEXT, taxon INTEGER, name TEXT);
             INSERT INTO genes VALUES ('7157', 9606, 'TP53');",
        );
        let mut source = SqliteSource::new(
            dir.path().join("genes.db"),
            "SELECT id, taxon, name FROM genes",
        );
        let rows = source.read_rows().unwrap();
        assert_eq!(rows, vec![SourceRow::with_taxon("7157", "9606", "TP53")]);
    }

    #[test]
    fn test_null_name_is_malformed() {
        let dir = database(
            "CREATE TABLE names (id TEXT, name TEXT);
             INSERT INTO names VALUES ('G1', NULL);",
        );
        let mut source =
            SqliteSource::new(dir.path().join("genes.db"), "SELECT id, name FROM names");
        assert!(source.read_rows().is_err());
    }

    #[test]
    fn test_whitespace_name_is_passed_through() {
        let dir = database(
            "CREATE TABLE names (id TEXT, name TEXT);
             INSERT INTO names VALUES ('G1', 'BRCA1'), ('G3', '   ');",
        );
        let mut source = SqliteSource::new(
            dir.path().join("genes.db"),
            "SELECT id, name FROM names ORDER BY id",
        );
        let rows = source.read_rows().unwrap();
        assert_eq!(rows[1], SourceRow::new("G3", "   "));
    }

    #[test]
    fn test_blob_column_is_unsupported() {
        let dir = database(
            "CREATE TABLE names (id TEXT, name BLOB);
             INSERT INTO names VALUES ('G1', x'4252');",
        );
        let mut source =
            SqliteSource::new(dir.path().join("genes.db"), "SELECT id, name FROM names");
        let err = source.read_rows().unwrap_err();
        assert!(err.to_string().contains("unsupported BLOB"));
    }

    #[test]
    fn test_wrong_column_count() {
        let dir = database("CREATE TABLE names (id TEXT);");
        let mut source = SqliteSource::new(dir.path().join("genes.db"), "SELECT id FROM names");
        assert!(source.read_rows().is_err());
    }

    #[test]
    fn test_missing_database() {
        let mut source = SqliteSource::new("/nonexistent/genes.db", "SELECT 1, 2");
        assert!(source.read_rows().is_err());
    }
}
