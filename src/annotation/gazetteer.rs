//! Generic gazetteer annotator.
//!
//! Runs the matcher over a document (or over the spans an upstream component
//! tagged with a given namespace) and emits one scored record per matched
//! `(span, entity)` pair.

use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::Annotator;
use crate::annotation::document::Document;
use crate::annotation::stats::MatchStats;
use crate::annotation::store::OutputRecord;
use crate::error::Result;
use crate::index::gazetteer::{EntityId, Gazetteer};
use crate::matcher::Matcher;
use crate::similarity::scorer::ConfidenceScorer;
use crate::span::Span;

/// Selects upstream annotations whose spans bound the matching.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanFilter {
    pub namespace: String,
    /// Only annotations with this id, when set.
    #[serde(default)]
    pub id: Option<String>,
}

impl SpanFilter {
    pub fn new<S: Into<String>>(namespace: S) -> Self {
        SpanFilter {
            namespace: namespace.into(),
            id: None,
        }
    }

    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The spans of `document` selected by this filter.
    pub fn spans(&self, document: &Document) -> Vec<Span> {
        document
            .annotations
            .query_by_namespace(&self.namespace, None)
            .filter(|a| self.id.as_ref().is_none_or(|id| *id == a.record.id))
            .map(|a| a.record.span)
            .collect()
    }
}

/// Annotates documents with the entities of one gazetteer.
#[derive(Debug)]
pub struct GazetteerAnnotator {
    gazetteer: Arc<Gazetteer>,
    namespace: String,
    restrict_to: Option<SpanFilter>,
    stats: Arc<MatchStats>,
}

impl GazetteerAnnotator {
    /// Create an annotator filing its records under `namespace`.
    pub fn new<S: Into<String>>(gazetteer: Arc<Gazetteer>, namespace: S) -> Self {
        if gazetteer.is_empty() {
            warn!("Gazetteer annotator created over an empty index; nothing will match");
        }
        GazetteerAnnotator {
            gazetteer,
            namespace: namespace.into(),
            restrict_to: None,
            stats: Arc::new(MatchStats::new()),
        }
    }

    /// Only match inside spans selected by `filter`.
    pub fn with_restriction(mut self, filter: SpanFilter) -> Self {
        self.restrict_to = Some(filter);
        self
    }

    /// Share statistics counters with other annotators.
    pub fn with_stats(mut self, stats: Arc<MatchStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn stats(&self) -> &Arc<MatchStats> {
        &self.stats
    }

    /// Match `text`, either whole or only inside `restrict_to`.
    pub fn annotate_text(&self, text: &str, restrict_to: Option<&[Span]>) -> Vec<OutputRecord> {
        self.scored_matches(text, restrict_to)
            .into_iter()
            .map(|(_, record)| record)
            .collect()
    }

    /// Match and score, keeping the entity handle of every record.
    pub(crate) fn scored_matches(
        &self,
        text: &str,
        restrict_to: Option<&[Span]>,
    ) -> Vec<(EntityId, OutputRecord)> {
        let matcher = Matcher::new(&self.gazetteer);
        let matches = match restrict_to {
            None => matcher.find(text),
            Some(spans) => matcher.find_in_spans(text, spans),
        };
        self.stats.add_matches(matches.len());

        let scorer = ConfidenceScorer::for_gazetteer(&self.gazetteer);
        let mut records = Vec::new();
        for (span, ids) in matches {
            let matched_text = &text[span.range()];
            for entity in ids {
                let record = self.gazetteer.entity(entity);
                let confidence = scorer.score(matched_text, record);
                records.push((entity, OutputRecord::new(span, record.id.clone(), confidence)));
            }
        }
        records
    }

    /// Spans the configured restriction selects in `document`, if any.
    pub(crate) fn restriction(&self, document: &Document) -> Option<Vec<Span>> {
        self.restrict_to.as_ref().map(|filter| filter.spans(document))
    }
}

impl Annotator for GazetteerAnnotator {
    fn annotate(&self, document: &mut Document) -> Result<Vec<OutputRecord>> {
        let restriction = self.restriction(document);
        let records = self.annotate_text(&document.text, restriction.as_deref());

        for record in &records {
            document.annotations.push(self.namespace.clone(), record.clone());
        }
        self.stats.add_document();
        self.stats.add_records(records.len());
        debug!("Document {}: {} {} records", document.id, records.len(), self.namespace);
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "gazetteer"
    }
}
