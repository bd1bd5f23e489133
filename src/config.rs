//! Configuration for index construction, backing sources and annotators.
//!
//! All configuration types are plain serde structs with `Default`
//! implementations and chained `with_*` setters, so they can be built in code
//! or loaded from a JSON file and then overridden from the command line.
//!
//! # Examples
//!
//! ```
//! use gazetteer::config::GazetteerConfig;
//!
//! let config = GazetteerConfig::default()
//!     .with_boundary_match(true)
//!     .with_generate_variants(true);
//! assert!(config.validate().is_ok());
//! assert!(!config.case_matching);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::{DEFAULT_SEPARATOR_PATTERN, KeyNormalizer};
use crate::analysis::variant::DEFAULT_MAX_VARIANT_TOKENS;
use crate::error::{GazetteerError, Result};

/// Matching policy and index construction options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazetteerConfig {
    /// Require exact-case key/text comparison.
    pub case_matching: bool,

    /// Also index each entity's raw id string.
    pub id_matching: bool,

    /// Require token-boundary alignment at both ends of a match.
    pub boundary_match: bool,

    /// Expand multi-token names into separator variants.
    pub generate_variants: bool,

    /// Characters treated as ignorable separators during key normalization.
    pub separator_pattern: String,

    /// Names with more content tokens than this are not expanded.
    pub max_variant_tokens: usize,
}

impl Default for GazetteerConfig {
    fn default() -> Self {
        GazetteerConfig {
            case_matching: false,
            id_matching: false,
            boundary_match: false,
            generate_variants: false,
            separator_pattern: DEFAULT_SEPARATOR_PATTERN.to_string(),
            max_variant_tokens: DEFAULT_MAX_VARIANT_TOKENS,
        }
    }
}

impl GazetteerConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GazetteerError::invalid_config(format!(
                "Failed to read configuration file '{}': {e}",
                path.display()
            ))
        })?;
        let config: GazetteerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_case_matching(mut self, enabled: bool) -> Self {
        self.case_matching = enabled;
        self
    }

    pub fn with_id_matching(mut self, enabled: bool) -> Self {
        self.id_matching = enabled;
        self
    }

    pub fn with_boundary_match(mut self, enabled: bool) -> Self {
        self.boundary_match = enabled;
        self
    }

    pub fn with_generate_variants(mut self, enabled: bool) -> Self {
        self.generate_variants = enabled;
        self
    }

    pub fn with_separator_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.separator_pattern = pattern.into();
        self
    }

    pub fn with_max_variant_tokens(mut self, max_tokens: usize) -> Self {
        self.max_variant_tokens = max_tokens;
        self
    }

    /// Check the configuration for errors.
    pub fn validate(&self) -> Result<()> {
        if self.max_variant_tokens == 0 {
            return Err(GazetteerError::invalid_config(
                "max_variant_tokens must be at least 1",
            ));
        }
        self.key_normalizer().map(|_| ())
    }

    /// Build the key normalizer described by this configuration.
    pub fn key_normalizer(&self) -> Result<KeyNormalizer> {
        KeyNormalizer::with_pattern(&self.separator_pattern, self.case_matching)
    }
}

/// Kind of backing source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Line-based `<id><SEP><name>` file.
    Delimited,
    /// SQLite database queried with [`SourceConfig::query`].
    Sqlite,
}

/// Description of where the (id, name) pairs come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// File or database path.
    pub path: PathBuf,

    /// Source kind.
    pub kind: SourceKind,

    /// Field separator for delimited files.
    pub separator: char,

    /// Whether rows carry a taxon column between id and name.
    pub with_taxon: bool,

    /// SQL query for database sources.
    pub query: Option<String>,

    /// Maximum time the initial load may take, in seconds.
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            path: PathBuf::new(),
            kind: SourceKind::Delimited,
            separator: '\t',
            with_taxon: false,
            query: None,
            timeout_secs: 60,
        }
    }
}

impl SourceConfig {
    /// A delimited file source at `path`.
    pub fn delimited<P: Into<PathBuf>>(path: P) -> Self {
        SourceConfig {
            path: path.into(),
            ..Default::default()
        }
    }

    /// A SQLite source at `path` answering `query`.
    pub fn sqlite<P: Into<PathBuf>, S: Into<String>>(path: P, query: S) -> Self {
        SourceConfig {
            path: path.into(),
            kind: SourceKind::Sqlite,
            query: Some(query.into()),
            ..Default::default()
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

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// The load timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Options of the gene annotator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneAnnotatorConfig {
    /// Namespace of upstream species annotations used by the consistency filter.
    /// `None` disables the filter.
    pub species_namespace: Option<String>,
}

impl Default for GeneAnnotatorConfig {
    fn default() -> Self {
        GeneAnnotatorConfig {
            species_namespace: Some("species".to_string()),
        }
    }
}
