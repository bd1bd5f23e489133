//! Tokenizer implementations for name and document analysis.
//!
//! Tokenizers split text into [`Token`](crate::analysis::token::Token)s. The
//! gazetteer only needs one segmentation rule, the Unicode category rule
//! implemented by [`category::CategoryTokenizer`], but the trait keeps the seam
//! open for alternative segmenters.
//!
//! # Examples
//!
//! ```
//! use gazetteer::analysis::tokenizer::Tokenizer;
//! use gazetteer::analysis::tokenizer::category::CategoryTokenizer;
//!
//! let tokenizer = CategoryTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("NF-kappaB").unwrap().collect();
//! let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, vec!["NF", "-", "kappa", "B"]);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so one tokenizer can be shared by all
/// document-processing threads.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod category;
