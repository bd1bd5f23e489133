//! Key normalization.
//!
//! Names and documents are reduced to the same canonical form before they
//! meet in the index: runs of separator characters collapse into a single
//! [`SEPARATOR`], and unless case matching is requested every character is
//! lowercased. A name's key is its normalized form without leading or
//! trailing separators.
//!
//! [`NormalizedText`] keeps, for every byte of the normalized form, the span
//! of the original character it came from, so hits found in normalized space
//! can be reported in original document offsets.
//!
//! # Examples
//!
//! ```
//! use gazetteer::analysis::normalizer::KeyNormalizer;
//!
//! let normalizer = KeyNormalizer::default();
//! assert_eq!(normalizer.make_key("NF-kappaB").as_deref(), Some("nf kappab"));
//! assert_eq!(normalizer.make_key("  (--)  "), None);
//! ```

use regex::Regex;

use crate::analysis::token::TokenType;
use crate::error::{GazetteerError, Result};

/// The canonical separator marker joining key fragments.
pub const SEPARATOR: char = ' ';

/// Default separator character class: anything that is not a letter, a number or a symbol.
pub const DEFAULT_SEPARATOR_PATTERN: &str = r"[^\p{L}\p{N}\p{S}]";

/// The set of characters treated as ignorable separators.
#[derive(Clone, Debug, Default)]
pub enum SeparatorClass {
    /// Non letter/number/symbol characters, decided from Unicode categories.
    #[default]
    Standard,
    /// A custom single-character regex class.
    Pattern(Regex),
}

impl SeparatorClass {
    /// Build a separator class from a regex pattern.
    ///
    /// The default pattern is recognized and answered from Unicode categories
    /// without running the regex engine per character.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        if pattern == DEFAULT_SEPARATOR_PATTERN {
            return Ok(SeparatorClass::Standard);
        }
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            GazetteerError::analysis(format!("Invalid separator pattern '{pattern}': {e}"))
        })?;
        Ok(SeparatorClass::Pattern(regex))
    }

    /// Whether `c` separates key fragments.
    ///
    /// The canonical [`SEPARATOR`] is always a separator, which keeps
    /// normalization idempotent under any custom pattern.
    pub fn is_separator(&self, c: char) -> bool {
        if c == SEPARATOR {
            return true;
        }
        match self {
            SeparatorClass::Standard => !TokenType::of(c).is_content(),
            SeparatorClass::Pattern(regex) => {
                let mut buf = [0u8; 4];
                regex.is_match(c.encode_utf8(&mut buf))
            }
        }
    }
}

/// Builds canonical lookup keys from raw names.
#[derive(Clone, Debug, Default)]
pub struct KeyNormalizer {
    separators: SeparatorClass,
    case_matching: bool,
}

impl KeyNormalizer {
    /// Create a normalizer with an explicit separator class and case policy.
    pub fn new(separators: SeparatorClass, case_matching: bool) -> Self {
        KeyNormalizer {
            separators,
            case_matching,
        }
    }

    /// Create a normalizer from a separator pattern.
    pub fn with_pattern(pattern: &str, case_matching: bool) -> Result<Self> {
        Ok(Self::new(SeparatorClass::from_pattern(pattern)?, case_matching))
    }

    /// Whether keys keep their original case.
    pub fn case_matching(&self) -> bool {
        self.case_matching
    }

    /// The separator class in use.
    pub fn separators(&self) -> &SeparatorClass {
        &self.separators
    }

    /// Build the lookup key of `name`.
    ///
    /// Returns `None` when the name has no content characters at all.
    pub fn make_key(&self, name: &str) -> Option<String> {
        let normalized = self.normalize_text(name, 0);
        let key = normalized.as_str().trim_matches(SEPARATOR);
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    /// Normalize a whole text, keeping the mapping back to original offsets.
    ///
    /// `base_offset` is added to every original offset, which lets callers
    /// normalize a slice of a larger document and still report document
    /// coordinates.
    pub fn normalize_text(&self, text: &str, base_offset: usize) -> NormalizedText {
        let mut normalized = NormalizedText {
            text: String::with_capacity(text.len()),
            origin: Vec::with_capacity(text.len()),
        };

        for (offset, c) in text.char_indices() {
            let span = (base_offset + offset, base_offset + offset + c.len_utf8());
            if self.case_matching {
                self.push_char(&mut normalized, c, span);
            } else {
                for folded in c.to_lowercase() {
                    self.push_char(&mut normalized, folded, span);
                }
            }
        }

        normalized
    }

    fn push_char(&self, normalized: &mut NormalizedText, c: char, span: (usize, usize)) {
        if self.separators.is_separator(c) {
            if normalized.text.ends_with(SEPARATOR) {
                // Extend the current separator run.
                if let Some(last) = normalized.origin.last_mut() {
                    last.1 = span.1;
                }
            } else {
                normalized.text.push(SEPARATOR);
                normalized.origin.push(span);
            }
        } else {
            normalized.text.push(c);
            for _ in 0..c.len_utf8() {
                normalized.origin.push(span);
            }
        }
    }
}

/// A normalized text together with its byte mapping to the original.
#[derive(Clone, Debug)]
pub struct NormalizedText {
    text: String,
    /// Original `(start, end)` character span of every normalized byte.
    origin: Vec<(usize, usize)>,
}

impl NormalizedText {
    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Byte length of the normalized text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the normalized text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether a key may start at normalized byte `pos`.
    ///
    /// Keys start on content characters, and only on the first normalized
    /// character produced by an original character.
    pub fn is_match_start(&self, pos: usize) -> bool {
        if pos >= self.text.len() || !self.text.is_char_boundary(pos) {
            return false;
        }
        if self.text.as_bytes()[pos] == SEPARATOR as u8 {
            return false;
        }
        pos == 0 || self.origin[pos - 1] != self.origin[pos]
    }

    /// Map the normalized byte range `[start, end)` back to original offsets.
    pub fn original_span(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if start >= end || end > self.origin.len() {
            return None;
        }
        Some((self.origin[start].0, self.origin[end - 1].1))
    }
}
