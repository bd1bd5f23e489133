//! Text analysis for name and document matching.
//!
//! This module provides the pieces shared by index construction and matching:
//! the category tokenizer that defines token boundaries, the key normalizer
//! that builds canonical lookup keys, and the separator variant expander.

pub mod normalizer;
pub mod token;
pub mod tokenizer;
pub mod variant;

// Re-export commonly used types
pub use normalizer::{KeyNormalizer, NormalizedText, SeparatorClass};
pub use token::{Token, TokenType};
pub use tokenizer::Tokenizer;
pub use tokenizer::category::CategoryTokenizer;
pub use variant::{VariantExpander, Variants};
