//! Line-based dictionary files.
//!
//! Each non-blank line holds `<id><SEP><name>`, or `<id><SEP><taxon><SEP><name>`
//! when the taxon column is enabled. The name is the remainder of the line,
//! so it may itself contain the separator character. Several lines may share
//! an id to register several names.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{EntitySource, SourceRow};
use crate::error::{GazetteerError, Result};

/// A dictionary file with one `(id, name)` pair per line.
#[derive(Clone, Debug)]
pub struct DelimitedFileSource {
    path: PathBuf,
    separator: char,
    with_taxon: bool,
}

impl DelimitedFileSource {
    /// Create a tab-separated source without taxon column.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        DelimitedFileSource {
            path: path.as_ref().to_path_buf(),
            separator: '\t',
            with_taxon: false,
        }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_taxon(mut self, enabled: bool) -> Self {
        self.with_taxon = enabled;
        self
    }

    /// Parse one line. Returns `Ok(None)` for blank lines.
    pub fn parse_line(&self, line: &str, line_num: usize) -> Result<Option<SourceRow>> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Ok(None);
        }

        let columns = if self.with_taxon { 3 } else { 2 };
        let fields: Vec<&str> = line.splitn(columns, self.separator).collect();
        let malformed = |what: &str| {
            GazetteerError::source(format!(
                "{}:{}: {what} in {:?}",
                self.path.display(),
                line_num,
                line
            ))
        };

        if fields.len() < columns {
            return Err(malformed("missing field"));
        }
        let id = fields[0].trim();
        if id.is_empty() {
            return Err(malformed("empty id"));
        }
        // Whitespace-only names are kept; the builder skips contentless keys.
        let name = fields[columns - 1];
        if name.is_empty() {
            return Err(malformed("empty name"));
        }

        let row = if self.with_taxon {
            let taxon = fields[1].trim();
            if taxon.is_empty() {
                return Err(malformed("empty taxon"));
            }
            SourceRow::with_taxon(id, taxon, name)
        } else {
            SourceRow::new(id, name)
        };
        Ok(Some(row))
    }
}

impl EntitySource for DelimitedFileSource {
    fn read_rows(&mut self) -> Result<Vec<SourceRow>> {
        let file = File::open(&self.path).map_err(|e| {
            GazetteerError::source(format!(
                "Failed to open dictionary file '{}': {e}",
                self.path.display()
            ))
        })?;

        let mut rows = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            if let Some(row) = self.parse_line(&line?, line_num + 1)? {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "delimited"
    }
}
