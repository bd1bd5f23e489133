//! Command line argument parsing for the gazetteer CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{GazetteerConfig, GeneAnnotatorConfig, SourceConfig};
use crate::error::{GazetteerError, Result};

/// Dictionary-based entity recognition for biomedical text
#[derive(Parser, Debug, Clone)]
#[command(name = "gazetteer")]
#[command(about = "Dictionary-based entity recognition for biomedical text")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct GazetteerArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl GazetteerArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load a dictionary and write an index snapshot
    Build(BuildArgs),

    /// Annotate a JSONL document file
    Annotate(AnnotateArgs),

    /// Match a piece of text against an index
    Lookup(LookupArgs),

    /// Show index statistics
    Stats(StatsArgs),
}

/// Matching policy flags, baked into the index at build time.
#[derive(Args, Debug, Clone, Default)]
pub struct MatchingArgs {
    /// JSON file with a full matching configuration (flags below override it)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Compare keys and text case-sensitively
    #[arg(long)]
    pub case_matching: bool,

    /// Also match entity ids appearing in the text
    #[arg(long)]
    pub id_matching: bool,

    /// Only accept matches aligned with token boundaries
    #[arg(long)]
    pub boundary_match: bool,

    /// Index separator variants of multi-token names
    #[arg(long)]
    pub generate_variants: bool,

    /// Regular expression of characters ignored inside names
    #[arg(long, value_name = "REGEX")]
    pub separator_regex: Option<String>,

    /// Names with more tokens than this are not expanded into variants
    #[arg(long, value_name = "N")]
    pub max_variant_tokens: Option<usize>,
}

impl MatchingArgs {
    /// Resolve the configuration: file (or defaults) first, then flags.
    pub fn to_config(&self) -> Result<GazetteerConfig> {
        let mut config = match &self.config {
            Some(path) => GazetteerConfig::from_json_file(path)?,
            None => GazetteerConfig::default(),
        };
        if self.case_matching {
            config.case_matching = true;
        }
        if self.id_matching {
            config.id_matching = true;
        }
        if self.boundary_match {
            config.boundary_match = true;
        }
        if self.generate_variants {
            config.generate_variants = true;
        }
        if let Some(pattern) = &self.separator_regex {
            config.separator_pattern = pattern.clone();
        }
        if let Some(max_tokens) = self.max_variant_tokens {
            config.max_variant_tokens = max_tokens;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Where the dictionary rows come from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Delimited dictionary file (`<id><SEP><name>` per line)
    #[arg(short, long, value_name = "FILE", conflicts_with = "sqlite")]
    pub dictionary: Option<PathBuf>,

    /// SQLite database holding the dictionary
    #[arg(long, value_name = "DB", requires = "query")]
    pub sqlite: Option<PathBuf>,

    /// SQL query returning `(id, name)` or `(id, taxon, name)` rows
    #[arg(long, value_name = "SQL")]
    pub query: Option<String>,

    /// Field separator of the dictionary file
    #[arg(long, default_value = "\t")]
    pub separator: char,

    /// Dictionary rows carry a taxon column between id and name
    #[arg(long)]
    pub taxon_column: bool,

    /// Give up loading the source after this many seconds
    #[arg(long, default_value = "60", value_name = "SECS")]
    pub timeout: u64,
}

impl SourceArgs {
    pub fn to_config(&self) -> Result<SourceConfig> {
        let config = match (&self.dictionary, &self.sqlite, &self.query) {
            (Some(path), None, _) => SourceConfig::delimited(path),
            (None, Some(path), Some(query)) => SourceConfig::sqlite(path, query),
            _ => {
                return Err(GazetteerError::invalid_config(
                    "Either --dictionary or --sqlite with --query is required",
                ));
            }
        };
        Ok(SourceConfig {
            separator: self.separator,
            with_taxon: self.taxon_column,
            timeout_secs: self.timeout.max(1),
            ..config
        })
    }
}

/// Arguments for building an index snapshot
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Path of the snapshot to write
    #[arg(short, long, value_name = "SNAPSHOT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub matching: MatchingArgs,

    /// Two-column file remapping taxon ids while loading
    #[arg(long, value_name = "FILE")]
    pub taxon_map: Option<PathBuf>,

    /// Overwrite an existing snapshot
    #[arg(long)]
    pub force: bool,
}

/// Arguments for annotating documents
#[derive(Parser, Debug, Clone)]
pub struct AnnotateArgs {
    /// Index snapshot written by `build`
    #[arg(value_name = "SNAPSHOT")]
    pub index: PathBuf,

    /// JSONL file of documents (`{"id": ..., "text": ...}` per line)
    #[arg(value_name = "DOCUMENTS")]
    pub input: PathBuf,

    /// Write annotated documents here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Namespace the records are filed under
    #[arg(short, long, default_value = "entity")]
    pub namespace: String,

    /// Only match inside upstream annotations of this namespace
    #[arg(long, value_name = "NAMESPACE")]
    pub restrict_to: Option<String>,

    /// Run the gene annotator (taxon property and species filter)
    #[arg(long)]
    pub gene: bool,

    /// Namespace of upstream species annotations
    #[arg(long, default_value = "species")]
    pub species_namespace: String,

    /// Disable the species consistency filter
    #[arg(long, requires = "gene")]
    pub no_species_filter: bool,

    /// Number of worker threads (default: number of CPUs)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

impl AnnotateArgs {
    pub fn gene_config(&self) -> GeneAnnotatorConfig {
        GeneAnnotatorConfig {
            species_namespace: (!self.no_species_filter).then(|| self.species_namespace.clone()),
        }
    }

    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Arguments for matching a text
#[derive(Parser, Debug, Clone)]
pub struct LookupArgs {
    /// Index snapshot written by `build`
    #[arg(value_name = "SNAPSHOT")]
    pub index: PathBuf,

    /// Text to match
    #[arg(value_name = "TEXT")]
    pub text: String,
}

/// Arguments for showing statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Index snapshot written by `build`
    #[arg(value_name = "SNAPSHOT")]
    pub index: PathBuf,

    /// List every key with its entities
    #[arg(long)]
    pub keys: bool,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
