//! Command line tokenizer for completion
//!
//! Splits a partially typed command line into words, quoted strings and runs of
//! word-break characters. Like the shell it serves, it never rejects input:
//! unterminated quotes run to the end of the line and a trailing backslash is
//! kept as part of the word.
//!
//! # Design Principles
//!
//! - **Lossless** - concatenating the raw text of every token gives back the line
//! - **Byte offsets** - spans index the original UTF-8 string
//! - **Quotes first** - a quote starting a token always opens a quoted region,
//!   even when the quote character is also a word break

use std::fmt;
use std::ops::Range;

/// Word breaks used when nothing else is configured: whitespace and `=`.
pub const DEFAULT_WORD_BREAKS: &str = " \t\n=";

/// Token types for a shell command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted run of non-break (or escaped) characters
    Word,
    /// Single- or double-quoted run, quotes included
    QuotedString,
    /// Run of word-break characters
    Break,
}

/// Token with position information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Text exactly as it appears on the line
    pub raw: String,
    pub span: Range<usize>,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, raw: &str, span: Range<usize>) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
            span,
        }
    }

    pub fn is_break(&self) -> bool {
        self.kind == TokenKind::Break
    }
}

/// Set of characters that separate words outside of quotes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBreaks {
    chars: Vec<char>,
}

impl WordBreaks {
    /// Build a break set from the characters of `chars`, ignoring duplicates
    pub fn new(chars: &str) -> Self {
        let mut set = Vec::new();
        for ch in chars.chars() {
            if !set.contains(&ch) {
                set.push(ch);
            }
        }
        Self { chars: set }
    }

    /// Check whether `ch` separates words
    pub fn contains(&self, ch: char) -> bool {
        self.chars.contains(&ch)
    }

    /// Return a copy without the given characters
    pub fn without(&self, excluded: &[char]) -> Self {
        Self {
            chars: self
                .chars
                .iter()
                .copied()
                .filter(|ch| !excluded.contains(ch))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Default for WordBreaks {
    fn default() -> Self {
        Self::new(DEFAULT_WORD_BREAKS)
    }
}

impl fmt::Display for WordBreaks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.chars {
            write!(f, "{}", ch.escape_default())?;
        }
        Ok(())
    }
}

/// Command line tokenizer
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    breaks: &'a WordBreaks,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer over `input`
    pub fn new(input: &'a str, breaks: &'a WordBreaks) -> Self {
        Self {
            input,
            pos: 0,
            breaks,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(input: &str, breaks: &WordBreaks) -> Vec<Token> {
        let mut lexer = Tokenizer::new(input, breaks);
        let mut tokens = Vec::new();

        while let Some(token) = lexer.next_token() {
            tokens.push(token);
        }

        tracing::trace!(count = tokens.len(), "tokenized command line");
        tokens
    }

    /// Get the next token, or `None` at the end of the line
    fn next_token(&mut self) -> Option<Token> {
        let ch = self.current_char()?;
        let start = self.pos;

        let kind = match ch {
            '"' | '\'' => {
                self.scan_quoted(ch);
                TokenKind::QuotedString
            }
            _ if self.breaks.contains(ch) => {
                self.scan_breaks();
                TokenKind::Break
            }
            _ => {
                self.scan_word();
                TokenKind::Word
            }
        };

        Some(Token::new(kind, &self.input[start..self.pos], start..self.pos))
    }

    /// Scan from an opening quote up to the matching unescaped quote or the end
    fn scan_quoted(&mut self, quote: char) {
        self.advance(); // Skip opening quote

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '\\' {
                self.advance();
            } else if ch == quote {
                return;
            }
        }
    }

    /// Scan a maximal run of escaped or non-break characters
    fn scan_word(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == '\\' {
                self.advance();
                self.advance();
            } else if self.breaks.contains(ch) {
                break;
            } else {
                self.advance();
            }
        }
    }

    /// Scan a maximal run of break characters; a quote ends the run
    fn scan_breaks(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == '"' || ch == '\'' || !self.breaks.contains(ch) {
                break;
            }
            self.advance();
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.pos += ch.len_utf8();
        }
    }
}

/// Strip quotes and resolve escapes in the raw text of a word token
///
/// One leading quote and, if present, one matching unescaped trailing quote are
/// removed; then every `\x` becomes `x`.
pub fn unquote(raw: &str) -> String {
    let inner = match raw.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &raw[1..];
            if closes_with(body, quote) {
                &body[..body.len() - 1]
            } else {
                body
            }
        }
        _ => raw,
    };

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                value.push(escaped);
            }
        } else {
            value.push(ch);
        }
    }
    value
}

/// Whether `body` (text after an opening quote) ends with an unescaped `quote`
fn closes_with(body: &str, quote: char) -> bool {
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            chars.next();
        } else if ch == quote {
            return chars.as_str().is_empty();
        }
    }
    false
}
