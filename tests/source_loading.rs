use std::fs;
use std::thread;
use std::time::Duration;

use gazetteer::config::{GazetteerConfig, SourceConfig};
use gazetteer::error::{GazetteerError, Result};
use gazetteer::index::{Gazetteer, GazetteerBuilder};
use gazetteer::matcher::Matcher;
use gazetteer::source::{EntitySource, MemorySource, SourceRow, load_rows, load_taxon_map, open_source};
use tempfile::TempDir;

/// A source that takes longer than any reasonable test timeout.
struct SlowSource;

impl EntitySource for SlowSource {
    fn read_rows(&mut self) -> Result<Vec<SourceRow>> {
        thread::sleep(Duration::from_secs(5));
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

fn build_from(config: &SourceConfig, gazetteer_config: GazetteerConfig) -> Result<Gazetteer> {
    let rows = load_rows(open_source(config)?, config.timeout())?;
    Ok(Gazetteer::build(gazetteer_config, rows)?.0)
}

#[test]
fn test_delimited_file_with_shared_ids() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("genes.tsv");
    fs::write(
        &path,
        "672\tBRCA1\n672\tbreast cancer 1\n\n7157\tTP53\n7157\tp53\n672\tBRCA1\n",
    )
    .unwrap();

    let rows = load_rows(open_source(&SourceConfig::delimited(&path))?, Duration::from_secs(10))?;
    assert_eq!(rows.len(), 5);

    let (gazetteer, stats) = Gazetteer::build(GazetteerConfig::default(), rows)?;
    assert_eq!(stats.entities, 2);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(gazetteer.entity_count(), 2);

    let brca1 = gazetteer.lookup_id("672").unwrap();
    assert_eq!(gazetteer.entity(brca1).names.len(), 2);
    assert_eq!(gazetteer.lookup_name("Breast Cancer 1"), vec![brca1]);
    Ok(())
}

#[test]
fn test_custom_separator_and_taxon_column() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("genes.csv");
    fs::write(&path, "7157|9606|TP53\n22059|10090|Trp53\n").unwrap();

    let config = SourceConfig::delimited(&path).with_separator('|').with_taxon(true);
    let gazetteer = build_from(&config, GazetteerConfig::default().with_case_matching(true))?;

    let human = gazetteer.lookup_id("7157").unwrap();
    let mouse = gazetteer.lookup_id("22059").unwrap();
    assert_eq!(gazetteer.taxon(human), Some("9606"));
    assert_eq!(gazetteer.taxon(mouse), Some("10090"));

    let found = Matcher::new(&gazetteer).find("TP53 vs Trp53");
    assert_eq!(found.len(), 2);
    Ok(())
}

#[test]
fn test_malformed_row_fails_the_build() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.tsv");
    fs::write(&path, "672\tBRCA1\nno-name-here\n").unwrap();

    let err = build_from(&SourceConfig::delimited(&path), GazetteerConfig::default()).unwrap_err();
    assert!(matches!(err, GazetteerError::Source(_)));
    assert!(err.to_string().contains(":2:"));
}

#[test]
fn test_missing_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = SourceConfig::delimited(dir.path().join("absent.tsv"));
    assert!(build_from(&config, GazetteerConfig::default()).is_err());
}

#[test]
fn test_contentless_names_are_skipped() -> Result<()> {
    let rows = vec![
        SourceRow::new("X1", "---"),
        SourceRow::new("X1", "IL-2"),
        SourceRow::new("X2", " . "),
    ];
    let (gazetteer, stats) = Gazetteer::build(GazetteerConfig::default(), rows)?;
    assert_eq!(stats.names_skipped, 2);
    assert_eq!(stats.names_indexed, 1);
    assert_eq!(gazetteer.key_count(), 1);
    assert_eq!(gazetteer.entity_count(), 1);
    Ok(())
}

#[test]
fn test_whitespace_and_punctuation_names_do_not_abort_loading() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("genes.tsv");
    fs::write(&path, "G1\tBRCA1\nG2\t---\nG3\t   \n").unwrap();

    let rows = load_rows(open_source(&SourceConfig::delimited(&path))?, Duration::from_secs(10))?;
    assert_eq!(rows.len(), 3);

    let (gazetteer, stats) = Gazetteer::build(GazetteerConfig::default(), rows)?;
    assert_eq!(stats.names_skipped, 2);
    assert_eq!(gazetteer.entity_count(), 1);
    assert!(gazetteer.lookup_id("G1").is_some());
    Ok(())
}

#[test]
fn test_load_timeout() {
    let err = load_rows(Box::new(SlowSource), Duration::from_millis(50)).unwrap_err();
    assert!(matches!(err, GazetteerError::Timeout(_)));
}

#[test]
fn test_memory_source() -> Result<()> {
    let source = MemorySource::new(vec![SourceRow::new("G1", "BRCA1")]);
    let rows = load_rows(Box::new(source), Duration::from_secs(10))?;
    assert_eq!(rows, vec![SourceRow::new("G1", "BRCA1")]);
    Ok(())
}

#[test]
fn test_taxon_remapping() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let map_path = dir.path().join("taxa.tsv");
    fs::write(&map_path, "10093\t10090\n").unwrap();

    let mut builder =
        GazetteerBuilder::new(GazetteerConfig::default())?.with_taxon_map(load_taxon_map(&map_path, '\t')?);
    builder.add_row(SourceRow::with_taxon("22059", "10093", "Trp53"))?;
    builder.add_row(SourceRow::with_taxon("7157", "9606", "TP53"))?;
    let (gazetteer, _) = builder.build();

    assert_eq!(gazetteer.taxon(gazetteer.lookup_id("22059").unwrap()), Some("10090"));
    assert_eq!(gazetteer.taxon(gazetteer.lookup_id("7157").unwrap()), Some("9606"));
    Ok(())
}

#[cfg(feature = "sqlite")]
#[test]
fn test_sqlite_source() -> Result<()> {
    use rusqlite::Connection;

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("genes.db");
    {
        let conn = Connection::open(&db)?;
        conn.execute_batch(
            "CREATE TABLE genes (id TEXT, taxon INTEGER, name TEXT);
             INSERT INTO genes VALUES ('672', 9606, 'BRCA1');
             INSERT INTO genes VALUES ('672', 9606, 'RNF53');
             INSERT INTO genes VALUES ('12189', 10090, 'Brca1');",
        )?;
    }

    let config = SourceConfig::sqlite(&db, "SELECT id, taxon, name FROM genes ORDER BY id");
    let gazetteer = build_from(&config, GazetteerConfig::default().with_case_matching(true))?;
    assert_eq!(gazetteer.entity_count(), 2);
    assert_eq!(gazetteer.taxon(gazetteer.lookup_id("12189").unwrap()), Some("10090"));

    let pairs = SourceConfig::sqlite(&db, "SELECT id, name FROM genes");
    let gazetteer = build_from(&pairs, GazetteerConfig::default())?;
    // Case folding merges BRCA1 and Brca1 into one homonym key.
    assert_eq!(gazetteer.lookup_name("brca1").len(), 2);
    Ok(())
}
