//! Separator variant expansion.
//!
//! Biomedical names are written with inconsistent separators: "NF-kappaB",
//! "NF kappaB" and "NFkappaB" all name the same complex. The expander
//! tokenizes a name and re-joins its content tokens with every combination
//! of `"-"`, `""` and `" "`, normalizing each combination into an additional
//! lookup key.
//!
//! A gap that was written as whitespace never collapses to `""`: two words
//! written apart are not glued into a single token.
//!
//! The number of combinations grows as `3^(tokens - 1)`, so names with more
//! content tokens than the configured cap are not expanded at all.

use std::collections::BTreeSet;

use log::debug;

use crate::analysis::normalizer::KeyNormalizer;
use crate::analysis::tokenizer::category::CategoryTokenizer;

/// Default cap on the number of content tokens considered for expansion.
pub const DEFAULT_MAX_VARIANT_TOKENS: usize = 8;

const JOINERS: [&str; 3] = ["-", "", " "];
const SPACE_JOINERS: [&str; 2] = ["-", " "];

/// The outcome of expanding one name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Variants {
    /// Additional keys, excluding the key of the name itself.
    pub keys: BTreeSet<String>,
    /// Whether expansion was skipped because the name has too many tokens.
    pub capped: bool,
}

/// Generates separator variants of multi-token names.
#[derive(Clone, Debug)]
pub struct VariantExpander {
    tokenizer: CategoryTokenizer,
    max_tokens: usize,
}

impl Default for VariantExpander {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VARIANT_TOKENS)
    }
}

impl VariantExpander {
    /// Create an expander that skips names with more than `max_tokens` content tokens.
    pub fn new(max_tokens: usize) -> Self {
        VariantExpander {
            tokenizer: CategoryTokenizer::new(),
            max_tokens,
        }
    }

    /// The content token cap.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Expand `name` into additional normalized keys.
    pub fn expand(&self, name: &str, normalizer: &KeyNormalizer) -> Variants {
        let (words, space_gaps) = self.split(name, normalizer);
        let mut variants = Variants::default();

        if words.len() < 2 {
            return variants;
        }
        if words.len() > self.max_tokens {
            debug!(
                "Skipping variant expansion of {:?}: {} tokens exceed the cap of {}",
                name,
                words.len(),
                self.max_tokens
            );
            variants.capped = true;
            return variants;
        }

        let original = normalizer.make_key(name);
        let choices: Vec<&[&str]> = space_gaps
            .iter()
            .map(|&space| {
                if space {
                    &SPACE_JOINERS[..]
                } else {
                    &JOINERS[..]
                }
            })
            .collect();

        // Odometer over the joiner choice of every gap.
        let mut selection = vec![0usize; choices.len()];
        loop {
            let mut joined = String::with_capacity(name.len() + words.len());
            joined.push_str(words[0]);
            for (gap, word) in words[1..].iter().enumerate() {
                joined.push_str(choices[gap][selection[gap]]);
                joined.push_str(word);
            }

            if let Some(key) = normalizer.make_key(&joined)
                && original.as_ref() != Some(&key)
            {
                variants.keys.insert(key);
            }

            let mut gap = 0;
            loop {
                if gap == selection.len() {
                    return variants;
                }
                selection[gap] += 1;
                if selection[gap] < choices[gap].len() {
                    break;
                }
                selection[gap] = 0;
                gap += 1;
            }
        }
    }

    /// Split a name into content tokens and record, for every gap between
    /// consecutive content tokens, whether it was written as whitespace.
    fn split<'a>(&self, name: &'a str, normalizer: &KeyNormalizer) -> (Vec<&'a str>, Vec<bool>) {
        let mut words = Vec::new();
        let mut space_gaps = Vec::new();
        let mut gap_start: Option<usize> = None;

        for (start, end) in self.tokenizer.spans(name) {
            let slice = &name[start..end];
            if slice.chars().all(|c| normalizer.separators().is_separator(c)) {
                if gap_start.is_none() {
                    gap_start = Some(start);
                }
                continue;
            }

            if !words.is_empty() {
                let gap = gap_start.map_or("", |s| &name[s..start]);
                space_gaps.push(!gap.is_empty() && gap.chars().all(char::is_whitespace));
            }
            gap_start = None;
            words.push(slice);
        }

        (words, space_gaps)
    }
}
