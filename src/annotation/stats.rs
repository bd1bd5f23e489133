//! Matching statistics shared by annotator threads.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// Counters updated concurrently by every thread running an annotator.
#[derive(Debug, Default)]
pub struct MatchStats {
    documents: AtomicUsize,
    matches: AtomicUsize,
    records: AtomicUsize,
    filtered: AtomicUsize,
}

/// A point-in-time copy of [`MatchStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStatsSnapshot {
    /// Documents annotated.
    pub documents: usize,
    /// Distinct matched spans.
    pub matches: usize,
    /// Records emitted.
    pub records: usize,
    /// Records dropped by the species filter.
    pub filtered: usize,
}

impl MatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_document(&self) {
        self.documents.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_matches(&self, count: usize) {
        self.matches.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn add_records(&self, count: usize) {
        self.records.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn add_filtered(&self, count: usize) {
        self.filtered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MatchStatsSnapshot {
        MatchStatsSnapshot {
            documents: self.documents.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
            records: self.records.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
        }
    }
}
