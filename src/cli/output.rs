//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::annotation::MatchStatsSnapshot;
use crate::cli::args::{GazetteerArgs, OutputFormat};
use crate::config::GazetteerConfig;
use crate::error::Result;
use crate::index::BuildStats;
use crate::span::Span;

/// Results that know how to print themselves for a terminal.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Result of `build`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BuildReport {
    pub snapshot: String,
    pub snapshot_bytes: u64,
    pub duration_ms: u64,
    pub stats: BuildStats,
}

/// Result of `annotate`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnnotateReport {
    pub threads: usize,
    pub duration_ms: u64,
    pub docs_per_second: f64,
    pub stats: MatchStatsSnapshot,
}

/// One matched `(span, entity)` pair of `lookup`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LookupHit {
    pub span: Span,
    pub text: String,
    pub id: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxon: Option<String>,
}

/// Result of `lookup`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResults {
    pub hits: Vec<LookupHit>,
}

/// One indexed key with the ids of its entities.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyEntry {
    pub key: String,
    pub ids: Vec<String>,
}

/// Result of `stats`.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexStats {
    pub entities: usize,
    pub keys: usize,
    pub trie_nodes: usize,
    pub snapshot_bytes: u64,
    pub config: GazetteerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_entries: Option<Vec<KeyEntry>>,
}

/// Output a result in the selected format.
pub fn output_result<T: Serialize + HumanReadable>(
    message: &str,
    result: &T,
    args: &GazetteerArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            result.print_human();
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
    }
    Ok(())
}

impl HumanReadable for BuildReport {
    fn print_human(&self) {
        println!("Build Statistics:");
        println!("════════════════");
        println!("Snapshot: {} ({})", self.snapshot, format_bytes(self.snapshot_bytes));
        println!("Rows read: {}", self.stats.rows);
        println!("Entities: {}", self.stats.entities);
        println!("Names indexed: {}", self.stats.names_indexed);
        if self.stats.names_skipped > 0 {
            println!("Names skipped (no content): {}", self.stats.names_skipped);
        }
        if self.stats.duplicates > 0 {
            println!("Duplicate rows: {}", self.stats.duplicates);
        }
        if self.stats.id_keys > 0 {
            println!("Id keys: {}", self.stats.id_keys);
        }
        if self.stats.variant_keys > 0 || self.stats.variants_capped > 0 {
            println!(
                "Variant keys: {} ({} names over the token cap)",
                self.stats.variant_keys, self.stats.variants_capped
            );
        }
        println!("Distinct keys: {}", self.stats.keys);
        println!("Trie nodes: {}", self.stats.trie_nodes);
        println!("Build time: {}", format_duration(self.duration_ms));
    }
}

impl HumanReadable for AnnotateReport {
    fn print_human(&self) {
        println!("Annotation Statistics:");
        println!("═════════════════════");
        println!("Documents: {}", self.stats.documents);
        println!("Matched spans: {}", self.stats.matches);
        println!("Records: {}", self.stats.records);
        if self.stats.filtered > 0 {
            println!("Dropped by species filter: {}", self.stats.filtered);
        }
        println!("Threads: {}", self.threads);
        println!(
            "Time: {} ({:.1} docs/s)",
            format_duration(self.duration_ms),
            self.docs_per_second
        );
    }
}

impl HumanReadable for LookupResults {
    fn print_human(&self) {
        if self.hits.is_empty() {
            println!("No matches");
            return;
        }
        for hit in &self.hits {
            let taxon = hit
                .taxon
                .as_deref()
                .map(|t| format!("  taxon={t}"))
                .unwrap_or_default();
            println!(
                "{:<12} {:<24} {:<16} {:.3}{taxon}",
                hit.span.to_string(),
                format!("{:?}", hit.text),
                hit.id,
                hit.confidence
            );
        }
        println!();
        println!("Total hits: {}", self.hits.len());
    }
}

impl HumanReadable for IndexStats {
    fn print_human(&self) {
        println!("Index Statistics:");
        println!("════════════════");
        println!("Entities: {}", self.entities);
        println!("Distinct keys: {}", self.keys);
        println!("Trie nodes: {}", self.trie_nodes);
        println!("Snapshot size: {}", format_bytes(self.snapshot_bytes));
        println!();
        println!("Matching Policy:");
        println!("───────────────");
        println!("case_matching: {}", self.config.case_matching);
        println!("id_matching: {}", self.config.id_matching);
        println!("boundary_match: {}", self.config.boundary_match);
        println!("generate_variants: {}", self.config.generate_variants);
        println!("separator_pattern: {}", self.config.separator_pattern);
        println!("max_variant_tokens: {}", self.config.max_variant_tokens);

        if let Some(entries) = &self.key_entries {
            println!();
            println!("Keys:");
            println!("─────");
            for entry in entries {
                println!("{}\t{}", entry.key, entry.ids.join(","));
            }
        }
    }
}

/// Format duration in a human-readable way.
fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) as f64 / 1000.0;
        format!("{minutes}m {seconds:.1}s")
    }
}

/// Format bytes in a human-readable way.
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{size:.1} {}", UNITS[unit_index])
    }
}
