//! Backing sources of `(id, name)` pairs.
//!
//! A source is read once, at startup, to populate the gazetteer. Any failure
//! here (an unreadable file, an unreachable database, a malformed row, a load
//! that exceeds its timeout) is fatal and aborts the index build.

use std::path::Path;
use std::thread;
use std::time::Duration;

use ahash::AHashMap;
use crossbeam_channel::{RecvTimeoutError, bounded};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::{SourceConfig, SourceKind};
use crate::error::{GazetteerError, Result};

pub mod delimited;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use delimited::DelimitedFileSource;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSource;

/// One row of a backing source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRow {
    pub id: String,
    pub taxon: Option<String>,
    pub name: String,
}

impl SourceRow {
    /// A plain `(id, name)` row.
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        SourceRow {
            id: id.into(),
            taxon: None,
            name: name.into(),
        }
    }

    /// An `(id, taxon, name)` row.
    pub fn with_taxon<I: Into<String>, T: Into<String>, N: Into<String>>(
        id: I,
        taxon: T,
        name: N,
    ) -> Self {
        SourceRow {
            id: id.into(),
            taxon: Some(taxon.into()),
            name: name.into(),
        }
    }
}

/// Trait for backing sources.
pub trait EntitySource: Send {
    /// Read every row of the source.
    fn read_rows(&mut self) -> Result<Vec<SourceRow>>;

    /// Get the name of this source (for logging).
    fn name(&self) -> &'static str;
}

/// A source over rows already held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    rows: Vec<SourceRow>,
}

impl MemorySource {
    pub fn new(rows: Vec<SourceRow>) -> Self {
        MemorySource { rows }
    }
}

impl EntitySource for MemorySource {
    fn read_rows(&mut self) -> Result<Vec<SourceRow>> {
        Ok(std::mem::take(&mut self.rows))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Open the source described by `config`.
pub fn open_source(config: &SourceConfig) -> Result<Box<dyn EntitySource>> {
    match config.kind {
        SourceKind::Delimited => Ok(Box::new(
            DelimitedFileSource::new(&config.path)
                .with_separator(config.separator)
                .with_taxon(config.with_taxon),
        )),
        #[cfg(feature = "sqlite")]
        SourceKind::Sqlite => {
            let query = config.query.as_deref().ok_or_else(|| {
                GazetteerError::invalid_config("A sqlite source needs a query")
            })?;
            Ok(Box::new(SqliteSource::new(&config.path, query).with_timeout(config.timeout())))
        }
        #[cfg(not(feature = "sqlite"))]
        SourceKind::Sqlite => Err(GazetteerError::invalid_config(
            "Built without sqlite support",
        )),
    }
}

/// Read all rows of `source` on a worker thread, waiting at most `timeout`.
///
/// An expired timeout is reported as [`GazetteerError::Timeout`]; the worker
/// is detached and its result discarded.
pub fn load_rows(mut source: Box<dyn EntitySource>, timeout: Duration) -> Result<Vec<SourceRow>> {
    let name = source.name();
    let (tx, rx) = bounded(1);

    thread::Builder::new()
        .name(format!("gazetteer-load-{name}"))
        .spawn(move || {
            let _ = tx.send(source.read_rows());
        })?;

    match rx.recv_timeout(timeout) {
        Ok(rows) => {
            let rows = rows?;
            info!("Loaded {} rows from {} source", rows.len(), name);
            Ok(rows)
        }
        Err(RecvTimeoutError::Timeout) => Err(GazetteerError::timeout(format!(
            "Loading the {name} source took longer than {}s",
            timeout.as_secs_f64()
        ))),
        Err(RecvTimeoutError::Disconnected) => Err(GazetteerError::source(format!(
            "The {name} source loader stopped without a result"
        ))),
    }
}

/// Load a taxon remapping table: one `<from><SEP><to>` pair per line.
pub fn load_taxon_map<P: AsRef<Path>>(path: P, separator: char) -> Result<AHashMap<String, String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        GazetteerError::source(format!(
            "Failed to read taxon map '{}': {e}",
            path.display()
        ))
    })?;

    let mut map = AHashMap::new();
    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.splitn(2, separator);
        match (fields.next().map(str::trim), fields.next().map(str::trim)) {
            (Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => {
                map.insert(from.to_string(), to.to_string());
            }
            _ => {
                return Err(GazetteerError::source(format!(
                    "{}:{}: expected <from>{:?}<to>",
                    path.display(),
                    line_num + 1,
                    separator
                )));
            }
        }
    }

    debug!("Loaded {} taxon remappings from {}", map.len(), path.display());
    Ok(map)
}
