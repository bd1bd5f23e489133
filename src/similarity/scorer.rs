//! Confidence scoring of matched spans.
//!
//! A span whose normalized form equals one of the entity's official names
//! (or its identifier, when identifier matching is on) scores 1.0. Spans
//! reached only through separator variants score the best normalized
//! Levenshtein similarity against the official names, which is always
//! below 1.0.

use crate::analysis::normalizer::KeyNormalizer;
use crate::index::gazetteer::{EntityRecord, Gazetteer};
use crate::similarity::levenshtein::levenshtein_similarity;

/// Rates matched text against an entity's known names.
#[derive(Clone, Copy, Debug)]
pub struct ConfidenceScorer<'a> {
    normalizer: &'a KeyNormalizer,
    id_matching: bool,
}

impl<'a> ConfidenceScorer<'a> {
    pub fn new(normalizer: &'a KeyNormalizer, id_matching: bool) -> Self {
        ConfidenceScorer {
            normalizer,
            id_matching,
        }
    }

    /// A scorer using the normalization and policy of `gazetteer`.
    pub fn for_gazetteer(gazetteer: &'a Gazetteer) -> Self {
        Self::new(gazetteer.normalizer(), gazetteer.config().id_matching)
    }

    /// Score `matched_text` against `record`, in `[0, 1]`.
    pub fn score(&self, matched_text: &str, record: &EntityRecord) -> f64 {
        let Some(key) = self.normalizer.make_key(matched_text) else {
            return 0.0;
        };

        if record.name_keys.contains(&key) {
            return 1.0;
        }
        if self.id_matching && record.id_key.as_deref() == Some(key.as_str()) {
            return 1.0;
        }

        // The identifier only counts for an exact hit.
        record
            .name_keys
            .iter()
            .map(|name_key| levenshtein_similarity(&key, name_key))
            .fold(0.0, f64::max)
            .clamp(0.0, 1.0)
    }
}
