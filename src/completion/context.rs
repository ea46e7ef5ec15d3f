//! Command line context with cursor awareness
//!
//! [`CommandContext`] turns a raw command line and a cursor offset into the
//! list of words the shell would see, plus the index of the word under the
//! cursor. The split is computed lazily and cached until the line, the cursor
//! or the break characters change.

use std::cell::OnceCell;
use std::ops::Range;

use super::token::{Token, Tokenizer, WordBreaks, unquote};

/// Words of a command line and the position of the cursor among them
#[derive(Debug, Clone, PartialEq, Eq)]
struct SplitLine {
    /// De-quoted words; the word under the cursor is cut at the cursor
    words: Vec<String>,
    /// Same words before de-quoting
    raw_words: Vec<String>,
    /// Index of the word containing the cursor
    word_index: usize,
}

/// Current state of the command line being completed
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Full contents of the command line
    command_line: String,
    /// Byte offset of the cursor in `command_line`
    cursor: usize,
    /// Characters separating words outside of quotes
    word_breaks: WordBreaks,
    /// Lazily computed split
    split: OnceCell<SplitLine>,
}

impl CommandContext {
    /// Create a context for `command_line` with the cursor at byte `cursor`
    pub fn new(command_line: impl Into<String>, cursor: usize) -> Self {
        Self {
            command_line: command_line.into(),
            cursor,
            word_breaks: WordBreaks::default(),
            split: OnceCell::new(),
        }
    }

    /// Create a context with the cursor at the end of the line
    pub fn at_end(command_line: impl Into<String>) -> Self {
        let command_line = command_line.into();
        let cursor = command_line.len();
        Self::new(command_line, cursor)
    }

    /// Use a different set of word-break characters
    pub fn with_word_breaks(mut self, word_breaks: WordBreaks) -> Self {
        self.set_word_breaks(word_breaks);
        self
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn set_command_line(&mut self, command_line: impl Into<String>) {
        self.command_line = command_line.into();
        self.split.take();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
        self.split.take();
    }

    pub fn word_breaks(&self) -> &WordBreaks {
        &self.word_breaks
    }

    pub fn set_word_breaks(&mut self, word_breaks: WordBreaks) {
        self.word_breaks = word_breaks;
        self.split.take();
    }

    /// All words on the line, including an empty word inserted at the cursor
    pub fn words(&self) -> &[String] {
        &self.split().words
    }

    /// Index of the word containing the cursor
    pub fn word_index(&self) -> usize {
        self.split().word_index
    }

    /// The word under the cursor, cut at the cursor
    pub fn current_word(&self) -> &str {
        self.word_at(self.word_index())
    }

    /// The word under the cursor as typed, quotes and escapes included
    pub fn raw_current_word(&self) -> &str {
        let split = self.split();
        split
            .raw_words
            .get(split.word_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Word at `index`, or an empty string when out of range
    pub fn word_at(&self, index: usize) -> &str {
        self.words().get(index).map(String::as_str).unwrap_or("")
    }

    fn split(&self) -> &SplitLine {
        self.split.get_or_init(|| {
            let cursor = floor_char_boundary(&self.command_line, self.cursor);
            split_line(&self.command_line, cursor, &self.word_breaks)
        })
    }
}

/// Move `index` back to the start of the character it falls in
fn floor_char_boundary(line: &str, index: usize) -> usize {
    if index >= line.len() {
        return index;
    }
    (0..=index)
        .rev()
        .find(|&i| line.is_char_boundary(i))
        .unwrap_or(0)
}

/// Adjacent non-break tokens make up one shell word
struct WordGroup<'t> {
    tokens: &'t [Token],
    span: Range<usize>,
}

impl WordGroup<'_> {
    fn raw(&self) -> String {
        self.tokens.iter().map(|t| t.raw.as_str()).collect()
    }

    fn value(&self) -> String {
        self.tokens.iter().map(|t| unquote(&t.raw)).collect()
    }

    /// Raw and de-quoted text of the part of this word before `cursor`
    fn cut_at(&self, cursor: usize) -> (String, String) {
        let mut raw = String::new();
        let mut value = String::new();
        for token in self.tokens {
            if token.span.start >= cursor {
                break;
            }
            let end = cursor.min(token.span.end) - token.span.start;
            let part = &token.raw[..end];
            raw.push_str(part);
            value.push_str(&unquote(part));
        }
        (raw, value)
    }
}

enum Segment<'t> {
    Word(WordGroup<'t>),
    Break(Range<usize>),
}

impl Segment<'_> {
    fn end(&self) -> usize {
        match self {
            Segment::Word(group) => group.span.end,
            Segment::Break(span) => span.end,
        }
    }
}

fn segments(tokens: &[Token]) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i].is_break() {
            segments.push(Segment::Break(tokens[i].span.clone()));
            i += 1;
            continue;
        }

        let start = i;
        while i < tokens.len() && !tokens[i].is_break() {
            i += 1;
        }
        let group = &tokens[start..i];
        segments.push(Segment::Word(WordGroup {
            tokens: group,
            span: group[0].span.start..group[group.len() - 1].span.end,
        }));
    }

    segments
}

fn split_line(line: &str, cursor: usize, breaks: &WordBreaks) -> SplitLine {
    let tokens = Tokenizer::tokenize(line, breaks);

    let mut words = Vec::new();
    let mut raw_words = Vec::new();
    let mut word_index = None;

    for segment in segments(&tokens) {
        let cursor_here = word_index.is_none() && segment.end() >= cursor;

        match segment {
            Segment::Break(_) if cursor_here => {
                // Cursor is in the space between words: complete a new word
                word_index = Some(words.len());
                words.push(String::new());
                raw_words.push(String::new());
            }
            Segment::Break(_) => {}
            Segment::Word(group) if cursor_here && cursor < group.span.end => {
                // Only the text typed before the cursor counts
                let (raw, value) = group.cut_at(cursor);
                word_index = Some(words.len());
                words.push(value);
                raw_words.push(raw);
            }
            Segment::Word(group) => {
                if cursor_here {
                    word_index = Some(words.len());
                }
                words.push(group.value());
                raw_words.push(group.raw());
            }
        }
    }

    let word_index = match word_index {
        Some(index) => index,
        None => {
            // Cursor is past the last token
            words.push(String::new());
            raw_words.push(String::new());
            words.len() - 1
        }
    };

    tracing::trace!(?words, word_index, "split command line");

    SplitLine {
        words,
        raw_words,
        word_index,
    }
}
