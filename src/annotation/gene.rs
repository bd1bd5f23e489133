//! Gene annotator: gazetteer matching plus taxon handling.
//!
//! Every record carries the `taxon` of its entity. When the document already
//! holds species annotations from an upstream tagger, genes whose taxon is
//! not among those species are dropped; without any species evidence every
//! match is kept.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;

use super::Annotator;
use crate::annotation::document::Document;
use crate::annotation::gazetteer::{GazetteerAnnotator, SpanFilter};
use crate::annotation::stats::MatchStats;
use crate::annotation::store::OutputRecord;
use crate::config::GeneAnnotatorConfig;
use crate::error::Result;
use crate::index::gazetteer::Gazetteer;
use crate::span::Span;

/// Property key carrying the taxon id of a gene record.
pub const TAXON_PROPERTY: &str = "taxon";

/// Annotates genes and keeps them consistent with the species in the document.
#[derive(Debug)]
pub struct GeneAnnotator {
    inner: GazetteerAnnotator,
    species_namespace: Option<String>,
}

impl GeneAnnotator {
    pub fn new<S: Into<String>>(
        gazetteer: Arc<Gazetteer>,
        namespace: S,
        config: &GeneAnnotatorConfig,
    ) -> Self {
        GeneAnnotator {
            inner: GazetteerAnnotator::new(gazetteer, namespace),
            species_namespace: config.species_namespace.clone(),
        }
    }

    /// Only match inside spans selected by `filter`.
    pub fn with_restriction(mut self, filter: SpanFilter) -> Self {
        self.inner = self.inner.with_restriction(filter);
        self
    }

    /// Share statistics counters with other annotators.
    pub fn with_stats(mut self, stats: Arc<MatchStats>) -> Self {
        self.inner = self.inner.with_stats(stats);
        self
    }

    pub fn stats(&self) -> &Arc<MatchStats> {
        self.inner.stats()
    }

    /// Taxon ids annotated in `document` by the species tagger.
    ///
    /// `None` when the filter is disabled or the document mentions no species.
    pub fn species_in(&self, document: &Document) -> Option<BTreeSet<String>> {
        let namespace = self.species_namespace.as_deref()?;
        let species: BTreeSet<String> = document
            .annotations
            .query_by_namespace(namespace, None)
            .map(|a| a.record.id.clone())
            .collect();
        if species.is_empty() { None } else { Some(species) }
    }

    /// Match `text`, attach taxa and apply the species filter when `species` is given.
    pub fn annotate_text(
        &self,
        text: &str,
        restrict_to: Option<&[Span]>,
        species: Option<&BTreeSet<String>>,
    ) -> Vec<OutputRecord> {
        let gazetteer = self.inner.gazetteer();
        let mut filtered = 0;
        let mut records = Vec::new();

        for (entity, mut record) in self.inner.scored_matches(text, restrict_to) {
            let taxon = gazetteer.taxon(entity);
            if let Some(species) = species
                && !taxon.is_some_and(|t| species.contains(t))
            {
                filtered += 1;
                continue;
            }
            if let Some(taxon) = taxon {
                record
                    .properties
                    .insert(TAXON_PROPERTY.to_string(), taxon.to_string());
            }
            records.push(record);
        }

        if filtered > 0 {
            debug!("Species filter dropped {filtered} gene records");
        }
        self.inner.stats().add_filtered(filtered);
        records
    }
}

impl Annotator for GeneAnnotator {
    fn annotate(&self, document: &mut Document) -> Result<Vec<OutputRecord>> {
        let restriction = self.inner.restriction(document);
        let species = self.species_in(document);
        let records = self.annotate_text(&document.text, restriction.as_deref(), species.as_ref());

        for record in &records {
            document
                .annotations
                .push(self.inner.namespace().to_string(), record.clone());
        }
        let stats = self.inner.stats();
        stats.add_document();
        stats.add_records(records.len());
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "gene"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GazetteerConfig;
    use crate::source::SourceRow;
    use std::collections::BTreeMap;

    fn annotator() -> GeneAnnotator {
        let rows = vec![
            SourceRow::with_taxon("7157", "9606", "TP53"),
            SourceRow::with_taxon("22059", "10090", "Trp53"),
            SourceRow::new("X1", "orphan gene"),
        ];
        let config = GazetteerConfig::default().with_boundary_match(true);
        let (gazetteer, _) = Gazetteer::build(config, rows).unwrap();
        GeneAnnotator::new(Arc::new(gazetteer), "gene", &GeneAnnotatorConfig::default())
    }

    #[test]
    fn test_taxon_property_is_attached() {
        let annotator = annotator();
        let mut doc = Document::new("d1", "TP53 and Trp53 are orthologs.");
        let records = annotator.annotate(&mut doc).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].property(TAXON_PROPERTY), Some("9606"));
        assert_eq!(records[1].property(TAXON_PROPERTY), Some("10090"));
    }

    #[test]
    fn test_species_filter_keeps_consistent_genes() {
        let annotator = annotator();
        let mut doc = Document::new("d1", "In human cells TP53 and Trp53 are mutated.");
        doc.annotations
            .add(Span::new(3, 8), "species", "9606", 1.0, BTreeMap::new());

        let records = annotator.annotate(&mut doc).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "7157");
        assert_eq!(records[0].property(TAXON_PROPERTY), Some("9606"));
        assert_eq!(annotator.stats().snapshot().filtered, 1);
    }

    #[test]
    fn test_no_species_evidence_bypasses_filter() {
        let annotator = annotator();
        let mut doc = Document::new("d1", "orphan gene and Trp53");
        let records = annotator.annotate(&mut doc).unwrap();
        let ids: BTreeSet<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains("X1"));
        assert!(ids.contains("22059"));
    }

    #[test]
    fn test_genes_without_taxon_fail_the_filter() {
        let annotator = annotator();
        let species: BTreeSet<String> = ["9606".to_string()].into();
        let records = annotator.annotate_text("orphan gene", None, Some(&species));
        assert!(records.is_empty());
    }

    #[test]
    fn test_disabled_filter() {
        let rows = vec![SourceRow::with_taxon("7157", "9606", "TP53")];
        let (gazetteer, _) = Gazetteer::build(GazetteerConfig::default(), rows).unwrap();
        let config = GeneAnnotatorConfig {
            species_namespace: None,
        };
        let annotator = GeneAnnotator::new(Arc::new(gazetteer), "gene", &config);

        let mut doc = Document::new("d1", "mouse TP53");
        doc.annotations
            .add(Span::new(0, 5), "species", "10090", 1.0, BTreeMap::new());
        assert_eq!(annotator.annotate(&mut doc).unwrap().len(), 1);
    }
}
