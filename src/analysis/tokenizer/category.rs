//! Unicode general category tokenizer.
//!
//! A position is a token boundary when the characters on either side belong
//! to different Unicode general categories. The one exception is an
//! uppercase-to-lowercase transition, which keeps a capitalized word together
//! ("Abc") and only splits when a run of several capitals precedes it
//! ("ABCdef" becomes "ABC" and "def").
//!
//! The start and the end of the text are always boundaries.

use unicode_general_category::{GeneralCategory, get_general_category};

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::error::Result;

/// Tokenizer that segments text at Unicode general category changes.
#[derive(Clone, Copy, Debug, Default)]
pub struct CategoryTokenizer;

impl CategoryTokenizer {
    /// Create a new category tokenizer.
    pub fn new() -> Self {
        CategoryTokenizer
    }

    /// Check whether `offset` (a byte offset) is a token boundary in `text`.
    ///
    /// Offsets that fall inside a multi-byte character, or beyond the end of
    /// the text, are never boundaries.
    pub fn is_boundary(&self, text: &str, offset: usize) -> bool {
        if offset == 0 || offset == text.len() {
            return true;
        }
        if offset > text.len() || !text.is_char_boundary(offset) {
            return false;
        }

        let mut before = text[..offset].chars().rev();
        let (Some(prev), Some(next)) = (before.next(), text[offset..].chars().next()) else {
            return true;
        };
        let prev_prev = before.next().map(get_general_category);

        split_between(
            prev_prev,
            get_general_category(prev),
            get_general_category(next),
        )
    }

    /// Compute the boundary flag of every byte offset `0..=text.len()`.
    ///
    /// Useful when many offsets of the same text are tested, as the matcher
    /// does for every candidate hit.
    pub fn boundary_map(&self, text: &str) -> BoundaryMap {
        let mut flags = vec![false; text.len() + 1];
        flags[0] = true;
        flags[text.len()] = true;

        let mut prev_prev: Option<GeneralCategory> = None;
        let mut prev: Option<GeneralCategory> = None;
        for (offset, c) in text.char_indices() {
            let category = get_general_category(c);
            if let Some(prev_category) = prev
                && split_between(prev_prev, prev_category, category)
            {
                flags[offset] = true;
            }
            prev_prev = prev;
            prev = Some(category);
        }

        BoundaryMap { flags }
    }

    /// Segment `text` into ordered, contiguous `(start, end)` byte spans.
    ///
    /// Every character belongs to exactly one span; separators such as spaces
    /// and hyphens form spans of their own.
    pub fn spans(&self, text: &str) -> Vec<(usize, usize)> {
        let map = self.boundary_map(text);
        let mut spans = Vec::new();
        let mut start = 0;
        for offset in 1..=text.len() {
            if map.is_boundary(offset) {
                spans.push((start, offset));
                start = offset;
            }
        }
        spans
    }

    /// Segment `text` into tokens, keeping separator tokens.
    pub fn tokens(&self, text: &str) -> Vec<Token> {
        self.spans(text)
            .into_iter()
            .enumerate()
            .map(|(position, (start, end))| {
                let slice = &text[start..end];
                let token_type = slice.chars().next().map_or(TokenType::Other, TokenType::of);
                Token::with_offsets(slice, position, start, end).with_token_type(token_type)
            })
            .collect()
    }
}

impl Tokenizer for CategoryTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        Ok(Box::new(self.tokens(text).into_iter()))
    }

    fn name(&self) -> &'static str {
        "category"
    }
}

/// Decide whether a boundary lies between two adjacent characters.
fn split_between(
    prev_prev: Option<GeneralCategory>,
    prev: GeneralCategory,
    next: GeneralCategory,
) -> bool {
    if prev == next {
        return false;
    }
    if prev == GeneralCategory::UppercaseLetter && next == GeneralCategory::LowercaseLetter {
        // "Abc" stays whole, "ABCdef" splits before the lowercase run.
        return prev_prev == Some(GeneralCategory::UppercaseLetter);
    }
    true
}

/// Precomputed boundary flags for one text.
#[derive(Clone, Debug)]
pub struct BoundaryMap {
    flags: Vec<bool>,
}

impl BoundaryMap {
    /// Whether `offset` is a boundary. Out-of-range offsets are not.
    pub fn is_boundary(&self, offset: usize) -> bool {
        self.flags.get(offset).copied().unwrap_or(false)
    }
}
