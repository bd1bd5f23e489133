//! Scanning text against a gazetteer.
//!
//! The matcher normalizes the text the same way names were normalized, then
//! asks the trie for every key that prefixes the text at each candidate start
//! position. Hits are reported in original byte offsets. Overlapping and
//! nested matches are all kept; identical `(span, entity)` pairs are merged.
//!
//! # Examples
//!
//! ```
//! use gazetteer::config::GazetteerConfig;
//! use gazetteer::index::Gazetteer;
//! use gazetteer::matcher::Matcher;
//! use gazetteer::source::SourceRow;
//! use gazetteer::span::Span;
//!
//! let rows = vec![SourceRow::new("G1", "BRCA1")];
//! let (gazetteer, _) = Gazetteer::build(GazetteerConfig::default(), rows).unwrap();
//!
//! let matches = Matcher::new(&gazetteer).find("brca1 was studied");
//! assert_eq!(matches.len(), 1);
//! assert!(matches.contains_key(&Span::new(0, 5)));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use log::debug;
use serde::Serialize;

use crate::analysis::tokenizer::category::{BoundaryMap, CategoryTokenizer};
use crate::index::gazetteer::{EntityId, Gazetteer};
use crate::span::Span;

/// Matched spans and the entities found at each of them.
pub type MatchMap = BTreeMap<Span, BTreeSet<EntityId>>;

/// One matched span with its candidate entities.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Match {
    pub span: Span,
    pub candidates: BTreeSet<EntityId>,
    pub matched_text: String,
}

/// Scans texts against one gazetteer using its matching policy.
#[derive(Clone, Copy, Debug)]
pub struct Matcher<'a> {
    gazetteer: &'a Gazetteer,
    tokenizer: CategoryTokenizer,
}

impl<'a> Matcher<'a> {
    pub fn new(gazetteer: &'a Gazetteer) -> Self {
        Matcher {
            gazetteer,
            tokenizer: CategoryTokenizer::new(),
        }
    }

    /// Match the whole text.
    pub fn find(&self, text: &str) -> MatchMap {
        self.find_in(text, 0..text.len())
    }

    /// Match only inside `range` of `text`.
    ///
    /// Offsets in the result are offsets into `text`. Boundaries are judged
    /// against the full text, so a range edge in the middle of a word is not
    /// a boundary. A range that is empty, out of bounds or splits a character
    /// yields no matches.
    pub fn find_in(&self, text: &str, range: Range<usize>) -> MatchMap {
        self.find_in_spans(text, &[Span::new(range.start, range.end)])
    }

    /// Match inside each of `spans` of `text` and merge the results.
    ///
    /// Boundaries of `text` are computed once for all spans.
    pub fn find_in_spans(&self, text: &str, spans: &[Span]) -> MatchMap {
        let mut matches = MatchMap::new();
        if spans.is_empty() || text.is_empty() || self.gazetteer.is_empty() {
            return matches;
        }

        let boundaries = self
            .gazetteer
            .config()
            .boundary_match
            .then(|| self.tokenizer.boundary_map(text));
        for span in spans {
            self.scan(text, span.range(), boundaries.as_ref(), &mut matches);
        }
        matches
    }

    fn scan(
        &self,
        text: &str,
        range: Range<usize>,
        boundaries: Option<&BoundaryMap>,
        matches: &mut MatchMap,
    ) {
        let Some(slice) = text.get(range.clone()) else {
            debug!("Ignoring invalid match range {range:?} for text of {} bytes", text.len());
            return;
        };
        if slice.is_empty() {
            return;
        }
        let is_boundary = |offset: usize| boundaries.is_none_or(|map| map.is_boundary(offset));

        let normalized = self.gazetteer.normalizer().normalize_text(slice, range.start);
        let bytes = normalized.as_str().as_bytes();
        let trie = self.gazetteer.trie();

        for pos in 0..bytes.len() {
            if !normalized.is_match_start(pos) {
                continue;
            }
            let Some((start, _)) = normalized.original_span(pos, pos + 1) else {
                continue;
            };
            if !is_boundary(start) {
                continue;
            }

            for (len, ids) in trie.prefixes(&bytes[pos..]) {
                let Some((_, end)) = normalized.original_span(pos, pos + len) else {
                    continue;
                };
                if !is_boundary(end) {
                    continue;
                }
                matches
                    .entry(Span::new(start, end))
                    .or_default()
                    .extend(ids.iter().copied());
            }
        }
    }

    /// Match the whole text and keep the matched substrings.
    pub fn matches(&self, text: &str) -> Vec<Match> {
        self.find(text)
            .into_iter()
            .map(|(span, candidates)| Match {
                span,
                candidates,
                matched_text: text[span.range()].to_string(),
            })
            .collect()
    }
}
