//! Annotators driving the matcher over documents.
//!
//! An [`Annotator`] reads a [`Document`], matches its text against a
//! gazetteer, appends the resulting records to the document's annotation
//! store and returns them. Annotators are `Send + Sync` and hold only
//! read-only index data plus atomic statistics, so one instance serves all
//! document-processing threads.

use rayon::prelude::*;

use crate::error::Result;

pub mod document;
pub mod gazetteer;
pub mod gene;
pub mod stats;
pub mod store;

pub use document::Document;
pub use gazetteer::{GazetteerAnnotator, SpanFilter};
pub use gene::{GeneAnnotator, TAXON_PROPERTY};
pub use stats::{MatchStats, MatchStatsSnapshot};
pub use store::{Annotation, AnnotationStore, OutputRecord};

/// Trait for components that annotate documents.
pub trait Annotator: Send + Sync {
    /// Annotate `document`, appending to its store and returning the new records.
    fn annotate(&self, document: &mut Document) -> Result<Vec<OutputRecord>>;

    /// Get the name of this annotator (for logging).
    fn name(&self) -> &'static str;
}

/// Annotate every document of `documents` in parallel on the current rayon pool.
///
/// Returns the total number of records emitted. The first failing document
/// aborts the batch.
pub fn annotate_all<A: Annotator + ?Sized>(annotator: &A, documents: &mut [Document]) -> Result<usize> {
    documents
        .par_iter_mut()
        .map(|document| annotator.annotate(document).map(|records| records.len()))
        .try_reduce(|| 0, |a, b| Ok(a + b))
}
