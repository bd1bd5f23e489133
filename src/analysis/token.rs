//! Token types produced by the category tokenizer.
//!
//! A [`Token`] is a maximal run of characters between two token boundaries.
//! Offsets are byte offsets into the original text, so a token can always be
//! sliced back out of its source with `&text[token.start_offset..token.end_offset]`.
//!
//! # Examples
//!
//! ```
//! use gazetteer::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("BRCA", 0, 0, 4).with_token_type(TokenType::Letter);
//! assert_eq!(token.len(), 4);
//! assert!(token.is_content());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_general_category::{GeneralCategory, get_general_category};

/// A token represents a single lexical unit of a name or document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Coarse classification of the token's first character
    pub token_type: TokenType,
}

/// Coarse token classification derived from Unicode general categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Letters (`L*`)
    Letter,
    /// Numbers (`N*`)
    Number,
    /// Symbols (`S*`)
    Symbol,
    /// Punctuation (`P*`)
    Punctuation,
    /// Space separators
    Whitespace,
    /// Marks, controls and everything else
    Other,
}

impl TokenType {
    /// Classify a single character.
    pub fn of(c: char) -> Self {
        use GeneralCategory::*;

        if c.is_whitespace() {
            return TokenType::Whitespace;
        }
        match get_general_category(c) {
            UppercaseLetter | LowercaseLetter | TitlecaseLetter | ModifierLetter
            | OtherLetter => TokenType::Letter,
            DecimalNumber | LetterNumber | OtherNumber => TokenType::Number,
            MathSymbol | CurrencySymbol | ModifierSymbol | OtherSymbol => TokenType::Symbol,
            ConnectorPunctuation | DashPunctuation | OpenPunctuation | ClosePunctuation
            | InitialPunctuation | FinalPunctuation | OtherPunctuation => TokenType::Punctuation,
            _ => TokenType::Other,
        }
    }

    /// Letters, numbers and symbols carry name content; everything else separates.
    pub fn is_content(&self) -> bool {
        matches!(
            self,
            TokenType::Letter | TokenType::Number | TokenType::Symbol
        )
    }
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        let text = text.into();
        let end_offset = text.len();
        let token_type = text.chars().next().map_or(TokenType::Other, TokenType::of);
        Token {
            text,
            position,
            start_offset: 0,
            end_offset,
            token_type,
        }
    }

    /// Create a new token with explicit byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        let mut token = Token::new(text, position);
        token.start_offset = start_offset;
        token.end_offset = end_offset;
        token
    }

    /// Override the token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    /// Byte length of the token text.
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    /// Whether the token covers no text.
    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Whether this token carries name content rather than separating it.
    pub fn is_content(&self) -> bool {
        self.token_type.is_content()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}..{}]",
            self.text, self.start_offset, self.end_offset
        )
    }
}

/// A stream of tokens.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;
