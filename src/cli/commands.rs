//! Command implementations for the gazetteer CLI.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use rayon::ThreadPoolBuilder;

use crate::annotation::{
    Annotator, Document, GazetteerAnnotator, GeneAnnotator, MatchStats, SpanFilter,
    annotate_all,
};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{GazetteerError, Result};
use crate::index::{Gazetteer, GazetteerBuilder};
use crate::matcher::Matcher;
use crate::similarity::ConfidenceScorer;
use crate::source::{load_rows, load_taxon_map, open_source};

/// Execute a CLI command.
pub fn execute_command(args: GazetteerArgs) -> Result<()> {
    match &args.command {
        Command::Build(build_args) => build_index(build_args, &args),
        Command::Annotate(annotate_args) => annotate_documents(annotate_args, &args),
        Command::Lookup(lookup_args) => lookup_text(lookup_args, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
    }
}

/// Load a source, build the index and write a snapshot.
fn build_index(args: &BuildArgs, cli_args: &GazetteerArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(GazetteerError::invalid_config(format!(
            "Snapshot '{}' already exists. Use --force to overwrite.",
            args.output.display()
        )));
    }

    let start_time = Instant::now();
    let config = args.matching.to_config()?;
    let source_config = args.source.to_config()?;

    let mut builder = GazetteerBuilder::new(config)?;
    if let Some(path) = &args.taxon_map {
        let taxon_map = load_taxon_map(path, '\t')?;
        info!("Loaded {} taxon remappings from {}", taxon_map.len(), path.display());
        builder = builder.with_taxon_map(taxon_map);
    }

    let source = open_source(&source_config)?;
    info!("Loading {} source {}", source.name(), source_config.path.display());
    for row in load_rows(source, source_config.timeout())? {
        builder.add_row(row)?;
    }
    let (gazetteer, stats) = builder.build();

    if let Some(parent) = args.output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    gazetteer.save(&args.output)?;

    output_result(
        "Index built successfully",
        &BuildReport {
            snapshot: args.output.to_string_lossy().to_string(),
            snapshot_bytes: file_size(&args.output),
            duration_ms: start_time.elapsed().as_millis() as u64,
            stats,
        },
        cli_args,
    )
}

/// Annotate a JSONL document file.
fn annotate_documents(args: &AnnotateArgs, cli_args: &GazetteerArgs) -> Result<()> {
    let gazetteer = Arc::new(Gazetteer::open(&args.index)?);
    let stats = Arc::new(MatchStats::new());
    let annotator = build_annotator(args, gazetteer, Arc::clone(&stats));
    debug!("Using {} annotator", annotator.name());

    let mut documents = read_documents(&args.input)?;
    let threads = args.thread_count();
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("gazetteer-annotate-{i}"))
        .build()
        .map_err(|e| GazetteerError::other(format!("Failed to create thread pool: {e}")))?;

    let start_time = Instant::now();
    let records = pool.install(|| annotate_all(annotator.as_ref(), &mut documents))?;
    let duration = start_time.elapsed();
    info!(
        "Annotated {} documents with {} records in {:.2}s",
        documents.len(),
        records,
        duration.as_secs_f64()
    );

    match &args.output {
        Some(path) => {
            write_documents(BufWriter::new(File::create(path)?), &documents)?;
            output_result(
                "Documents annotated successfully",
                &AnnotateReport {
                    threads,
                    duration_ms: duration.as_millis() as u64,
                    docs_per_second: if duration.as_secs_f64() > 0.0 {
                        documents.len() as f64 / duration.as_secs_f64()
                    } else {
                        0.0
                    },
                    stats: stats.snapshot(),
                },
                cli_args,
            )
        }
        // Stdout carries the documents; the summary went to the log.
        None => write_documents(io::stdout().lock(), &documents),
    }
}

fn build_annotator(
    args: &AnnotateArgs,
    gazetteer: Arc<Gazetteer>,
    stats: Arc<MatchStats>,
) -> Box<dyn Annotator> {
    let restriction = args.restrict_to.as_ref().map(SpanFilter::new);
    if args.gene {
        let mut annotator = GeneAnnotator::new(gazetteer, args.namespace.clone(), &args.gene_config())
            .with_stats(stats);
        if let Some(filter) = restriction {
            annotator = annotator.with_restriction(filter);
        }
        Box::new(annotator)
    } else {
        let mut annotator = GazetteerAnnotator::new(gazetteer, args.namespace.clone()).with_stats(stats);
        if let Some(filter) = restriction {
            annotator = annotator.with_restriction(filter);
        }
        Box::new(annotator)
    }
}

/// Read one JSON document per non-empty line.
fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let reader = BufReader::new(File::open(path).map_err(|e| {
        GazetteerError::source(format!("Failed to open '{}': {e}", path.display()))
    })?);

    let mut documents = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let document = Document::from_json(&line).map_err(|e| {
            GazetteerError::serialization(format!("{}:{}: {e}", path.display(), line_num + 1))
        })?;
        documents.push(document);
    }
    debug!("Read {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

fn write_documents<W: Write>(mut writer: W, documents: &[Document]) -> Result<()> {
    for document in documents {
        serde_json::to_writer(&mut writer, document)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Match a single text and list every `(span, entity)` pair.
fn lookup_text(args: &LookupArgs, cli_args: &GazetteerArgs) -> Result<()> {
    let gazetteer = Gazetteer::open(&args.index)?;
    let scorer = ConfidenceScorer::for_gazetteer(&gazetteer);

    let mut hits = Vec::new();
    for found in Matcher::new(&gazetteer).matches(&args.text) {
        for entity in &found.candidates {
            let record = gazetteer.entity(*entity);
            hits.push(LookupHit {
                span: found.span,
                text: found.matched_text.clone(),
                id: record.id.clone(),
                confidence: scorer.score(&found.matched_text, record),
                taxon: record.taxon.clone(),
            });
        }
    }

    output_result("Lookup finished", &LookupResults { hits }, cli_args)
}

/// Print statistics of a snapshot.
fn show_stats(args: &StatsArgs, cli_args: &GazetteerArgs) -> Result<()> {
    let gazetteer = Gazetteer::open(&args.index)?;

    let key_entries = args.keys.then(|| {
        gazetteer
            .trie()
            .entries()
            .into_iter()
            .map(|(key, ids)| KeyEntry {
                key,
                ids: ids.iter().map(|id| gazetteer.entity(*id).id.clone()).collect(),
            })
            .collect()
    });

    output_result(
        "Index statistics",
        &IndexStats {
            entities: gazetteer.entity_count(),
            keys: gazetteer.key_count(),
            trie_nodes: gazetteer.trie().node_count(),
            snapshot_bytes: file_size(&args.index),
            config: gazetteer.config().clone(),
            key_entries,
        },
        cli_args,
    )
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn run(argv: &[&str]) -> Result<()> {
        let args = GazetteerArgs::try_parse_from(argv).unwrap();
        execute_command(args)
    }

    #[test]
    fn test_build_then_annotate() {
        let dir = TempDir::new().unwrap();
        let dictionary = write(&dir, "genes.tsv", "672\t9606\tBRCA1\n7157\t9606\tTP53\n");
        let documents = write(
            &dir,
            "docs.jsonl",
            "{\"id\": \"d1\", \"text\": \"BRCA1 and TP53.\"}\n\n{\"id\": \"d2\", \"text\": \"nothing\"}\n",
        );
        let snapshot = dir.path().join("genes.gztr");
        let output = dir.path().join("out.jsonl");

        run(&[
            "gazetteer",
            "-q",
            "build",
            "-d",
            dictionary.to_str().unwrap(),
            "--taxon-column",
            "--boundary-match",
            "-o",
            snapshot.to_str().unwrap(),
        ])
        .unwrap();
        assert!(snapshot.exists());

        run(&[
            "gazetteer",
            "-q",
            "annotate",
            snapshot.to_str().unwrap(),
            documents.to_str().unwrap(),
            "--gene",
            "-n",
            "gene",
            "-t",
            "2",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let annotated = read_documents(&output).unwrap();
        assert_eq!(annotated.len(), 2);
        let genes: Vec<_> = annotated[0]
            .annotations
            .query_by_namespace("gene", None)
            .map(|a| a.record.id.clone())
            .collect();
        assert_eq!(genes, vec!["672", "7157"]);
        assert!(annotated[1].annotations.is_empty());
    }

    #[test]
    fn test_build_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let dictionary = write(&dir, "genes.tsv", "672\tBRCA1\n");
        let snapshot = write(&dir, "genes.gztr", "existing");

        let result = run(&[
            "gazetteer",
            "-q",
            "build",
            "-d",
            dictionary.to_str().unwrap(),
            "-o",
            snapshot.to_str().unwrap(),
        ]);
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&snapshot).unwrap(), "existing");
    }

    #[test]
    fn test_malformed_document_line() {
        let dir = TempDir::new().unwrap();
        let documents = write(&dir, "docs.jsonl", "{\"id\": \"d1\", \"text\": \"ok\"}\nnot json\n");
        let err = read_documents(&documents).unwrap_err();
        assert!(err.to_string().contains(":2:"));
    }
}
