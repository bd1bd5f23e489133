use std::collections::BTreeSet;

use gazetteer::analysis::{KeyNormalizer, SeparatorClass};
use gazetteer::annotation::{Annotator, Document, GazetteerAnnotator};
use gazetteer::config::GazetteerConfig;
use gazetteer::error::Result;
use gazetteer::index::Gazetteer;
use gazetteer::matcher::Matcher;
use gazetteer::similarity::{ConfidenceScorer, levenshtein_similarity};
use gazetteer::source::SourceRow;
use gazetteer::span::Span;
use std::sync::Arc;

fn build(config: GazetteerConfig, rows: &[(&str, &str)]) -> Gazetteer {
    let rows = rows.iter().map(|(id, name)| SourceRow::new(*id, *name));
    Gazetteer::build(config, rows).unwrap().0
}

fn ids(gazetteer: &Gazetteer, found: &BTreeSet<gazetteer::index::EntityId>) -> Vec<String> {
    found.iter().map(|id| gazetteer.entity(*id).id.clone()).collect()
}

#[test]
fn test_normalization_is_idempotent() {
    let samples = [
        "NF-kappaB",
        "  IL-2 receptor alpha ",
        "p53/TP53",
        "α-synuclein",
        "HLA-DR(B1)*04",
        "A  --  B",
        "TNF-α",
        "",
        "---",
    ];
    for case_matching in [false, true] {
        let normalizer = KeyNormalizer::new(SeparatorClass::Standard, case_matching);
        for sample in samples {
            let once = normalizer.normalize_text(sample, 0);
            let twice = normalizer.normalize_text(once.as_str(), 0);
            assert_eq!(once.as_str(), twice.as_str(), "not idempotent for {sample:?}");

            if let Some(key) = normalizer.make_key(sample) {
                assert_eq!(normalizer.make_key(&key), Some(key.clone()));
            }
        }
    }
}

#[test]
fn test_exact_match_confidence() -> Result<()> {
    let rows = [
        ("G1", "BRCA1"),
        ("G2", "tumor necrosis factor"),
        ("G3", "IL-2"),
        ("G4", "α-synuclein"),
    ];
    let gazetteer = build(GazetteerConfig::default().with_boundary_match(true), &rows);
    let scorer = ConfidenceScorer::for_gazetteer(&gazetteer);
    let matcher = Matcher::new(&gazetteer);

    for (id, name) in rows {
        let text = format!("We measured {name} levels.");
        let entity = gazetteer.lookup_id(id).unwrap();
        let start = "We measured ".len();
        let span = Span::new(start, start + name.len());

        let found = matcher.find(&text);
        let candidates = found.get(&span).unwrap_or_else(|| panic!("no match for {name}"));
        assert!(candidates.contains(&entity));
        assert_eq!(scorer.score(&text[span.range()], gazetteer.entity(entity)), 1.0);
    }
    Ok(())
}

#[test]
fn test_case_policy() {
    let insensitive = build(GazetteerConfig::default(), &[("G1", "BRCA1")]);
    let found = Matcher::new(&insensitive).find("brca1 was studied");
    assert_eq!(ids(&insensitive, &found[&Span::new(0, 5)]), vec!["G1"]);
    let scorer = ConfidenceScorer::for_gazetteer(&insensitive);
    assert_eq!(scorer.score("brca1", insensitive.entity(insensitive.lookup_id("G1").unwrap())), 1.0);

    let sensitive = build(GazetteerConfig::default().with_case_matching(true), &[("G1", "BRCA1")]);
    assert!(Matcher::new(&sensitive).find("brca1 was studied").is_empty());
    assert_eq!(Matcher::new(&sensitive).find("BRCA1 was studied").len(), 1);
}

#[test]
fn test_boundary_rejection() {
    let strict = build(GazetteerConfig::default().with_boundary_match(true), &[("C1", "cat")]);
    assert!(Matcher::new(&strict).find("category").is_empty());

    let loose = build(GazetteerConfig::default(), &[("C1", "cat")]);
    let found = Matcher::new(&loose).find("category");
    assert_eq!(found.len(), 1);
    assert!(found.contains_key(&Span::new(0, 3)));
}

#[test]
fn test_id_matching() {
    let config = GazetteerConfig::default().with_id_matching(true);
    let gazetteer = build(config, &[("G3", "growth factor 3")]);
    let text = "G3 is well studied.";

    let found = Matcher::new(&gazetteer).find(text);
    let span = Span::new(0, 2);
    assert_eq!(ids(&gazetteer, &found[&span]), vec!["G3"]);

    let scorer = ConfidenceScorer::for_gazetteer(&gazetteer);
    let record = gazetteer.entity(gazetteer.lookup_id("G3").unwrap());
    assert_eq!(scorer.score(&text[span.range()], record), 1.0);

    let without = build(GazetteerConfig::default(), &[("G3", "growth factor 3")]);
    assert!(Matcher::new(&without).find(text).is_empty());
}

#[test]
fn test_variant_space_rule() {
    let config = GazetteerConfig::default().with_generate_variants(true);
    let gazetteer = build(config, &[("H1", "high mobility"), ("N1", "NF-kappaB")]);
    let normalizer = gazetteer.normalizer();
    let trie = gazetteer.trie();

    let key = |s: &str| normalizer.make_key(s).unwrap();
    assert!(trie.get(&key("highmobility")).is_none());
    assert!(trie.get(&key("high-mobility")).is_some());
    assert!(trie.get(&key("NFkappaB")).is_some());
    assert!(trie.get(&key("NF kappaB")).is_some());

    assert!(Matcher::new(&gazetteer).find("highmobility group").is_empty());
}

#[test]
fn test_variant_matches_score_below_one() {
    let config = GazetteerConfig::default()
        .with_generate_variants(true)
        .with_boundary_match(true);
    let gazetteer = build(config, &[("N1", "NF-kappaB")]);
    let text = "Inhibition of NFkappaB signalling.";

    let found = Matcher::new(&gazetteer).find(text);
    let span = Span::new(14, 22);
    assert_eq!(&text[span.range()], "NFkappaB");
    assert_eq!(ids(&gazetteer, &found[&span]), vec!["N1"]);

    let record = gazetteer.entity(gazetteer.lookup_id("N1").unwrap());
    let confidence = ConfidenceScorer::for_gazetteer(&gazetteer).score("NFkappaB", record);
    let normalizer = gazetteer.normalizer();
    let similarity = levenshtein_similarity(
        &normalizer.make_key("NFkappaB").unwrap(),
        &normalizer.make_key("NF-kappaB").unwrap(),
    );
    assert!(confidence < 1.0);
    assert!(confidence >= similarity);
    assert!(confidence > 0.0);
}

#[test]
fn test_end_to_end_scenario() -> Result<()> {
    let config = GazetteerConfig::default()
        .with_boundary_match(true)
        .with_case_matching(false);
    let gazetteer = build(config, &[("G1", "BRCA1"), ("G2", "BRCA2")]);
    let annotator = GazetteerAnnotator::new(Arc::new(gazetteer), "gene");

    let mut document = Document::new("doc-1", "Mutations in BRCA1 and brca2 were studied.");
    let records = annotator.annotate(&mut document)?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].span, Span::new(13, 18));
    assert_eq!(&document.text[records[0].span.range()], "BRCA1");
    assert_eq!(records[0].id, "G1");
    assert_eq!(records[0].confidence, 1.0);
    assert_eq!(records[1].span, Span::new(23, 28));
    assert_eq!(&document.text[records[1].span.range()], "brca2");
    assert_eq!(records[1].id, "G2");
    assert_eq!(records[1].confidence, 1.0);
    assert_eq!(document.annotations.len(), 2);
    Ok(())
}

#[test]
fn test_overlapping_matches_are_all_reported_once() {
    let rows = [("A", "tumor necrosis factor"), ("B", "tumor necrosis"), ("C", "necrosis")];
    let gazetteer = build(GazetteerConfig::default().with_boundary_match(true), &rows);
    let text = "tumor necrosis factor";
    let found = Matcher::new(&gazetteer).find(text);

    let spans: Vec<&str> = found.keys().map(|span| &text[span.range()]).collect();
    assert_eq!(spans, vec!["tumor necrosis", "tumor necrosis factor", "necrosis"]);
    assert!(found.values().all(|ids| ids.len() == 1));
}

#[test]
fn test_empty_inputs() {
    let gazetteer = build(GazetteerConfig::default(), &[("G1", "BRCA1")]);
    assert!(Matcher::new(&gazetteer).find("").is_empty());

    let empty = Gazetteer::build(GazetteerConfig::default(), Vec::new()).unwrap().0;
    assert!(empty.is_empty());
    assert!(Matcher::new(&empty).find("BRCA1").is_empty());
}
