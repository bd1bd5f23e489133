//! String similarity and match confidence.

pub mod levenshtein;
pub mod scorer;

pub use levenshtein::{levenshtein_distance, levenshtein_similarity};
pub use scorer::ConfidenceScorer;
