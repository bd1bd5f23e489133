//! # Gazetteer
//!
//! Dictionary-based named-entity recognition for biomedical text.
//!
//! A [`Gazetteer`](index::Gazetteer) is built once from `(id, name)` rows of a
//! backing source (a delimited file or a SQLite database). Names are reduced
//! to separator-insensitive keys, optionally expanded into spelling variants
//! ("NF-kappaB", "NFkappaB", "NF kappaB") and stored in a radix trie. The
//! [`Matcher`](matcher::Matcher) then finds every span of a text whose key is
//! in the index, and annotators turn the matches into scored records.
//!
//! ## Features
//!
//! - Case-insensitive or case-sensitive matching
//! - Separator-tolerant keys with configurable separator classes
//! - Optional token-boundary alignment based on Unicode general categories
//! - Levenshtein confidence scores for inexact matches
//! - Gene annotation with taxon-aware species filtering
//! - Binary index snapshots
//!
//! ## Example
//!
//! ```
//! use gazetteer::prelude::*;
//!
//! let rows = vec![SourceRow::new("4790", "NF-kappaB")];
//! let config = GazetteerConfig::default().with_boundary_match(true);
//! let (gazetteer, stats) = Gazetteer::build(config, rows).unwrap();
//! assert_eq!(stats.entities, 1);
//!
//! let matches = Matcher::new(&gazetteer).find("activation of NF kappaB in cells");
//! assert_eq!(matches.len(), 1);
//! ```

pub mod analysis;
pub mod annotation;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod matcher;
pub mod similarity;
pub mod source;
pub mod span;

pub mod prelude {
    pub use crate::annotation::{
        Annotator, Document, GazetteerAnnotator, GeneAnnotator, OutputRecord, SpanFilter,
    };
    pub use crate::config::{GazetteerConfig, GeneAnnotatorConfig, SourceConfig};
    pub use crate::error::{GazetteerError, Result};
    pub use crate::index::{BuildStats, EntityId, Gazetteer};
    pub use crate::matcher::{MatchMap, Matcher};
    pub use crate::source::SourceRow;
    pub use crate::span::Span;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
