//! Error types for the gazetteer library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`GazetteerError`] enum. Index build failures (malformed rows, unreadable
//! sources, load timeouts) are fatal to startup; per-document matching never
//! fails on its input.
//!
//! # Examples
//!
//! ```
//! use gazetteer::error::{GazetteerError, Result};
//!
//! fn load() -> Result<()> {
//!     Err(GazetteerError::source("line 3: missing name field"))
//! }
//!
//! match load() {
//!     Ok(_) => println!("Loaded"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for gazetteer operations.
#[derive(Error, Debug)]
pub enum GazetteerError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Backing source errors (malformed rows, unreachable database, ...)
    #[error("Source error: {0}")]
    Source(String),

    /// Analysis-related errors (separator patterns, normalization)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Index-related errors (trie, snapshot files)
    #[error("Index error: {0}")]
    Index(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A blocking operation did not finish in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Binary serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with GazetteerError.
pub type Result<T> = std::result::Result<T, GazetteerError>;

impl GazetteerError {
    /// Create a new source error.
    pub fn source<S: Into<String>>(msg: S) -> Self {
        GazetteerError::Source(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        GazetteerError::Analysis(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        GazetteerError::Index(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        GazetteerError::Config(msg.into())
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        GazetteerError::Timeout(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        GazetteerError::Serialization(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        GazetteerError::Other(msg.into())
    }
}

impl From<bincode::Error> for GazetteerError {
    fn from(err: bincode::Error) -> Self {
        GazetteerError::Serialization(err.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for GazetteerError {
    fn from(err: rusqlite::Error) -> Self {
        GazetteerError::Source(format!("Database error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = GazetteerError::source("missing name");
        assert_eq!(error.to_string(), "Source error: missing name");

        let error = GazetteerError::analysis("bad pattern");
        assert_eq!(error.to_string(), "Analysis error: bad pattern");

        let error = GazetteerError::timeout("load took too long");
        assert_eq!(error.to_string(), "Timeout: load took too long");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = GazetteerError::from(io_error);

        match error {
            GazetteerError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
