//! Prefix-glob filtering of completion candidates
//!
//! Candidates are kept when they match the glob `<current word>*`, the same
//! test bash applies with `fnmatch`. Matching is case-sensitive and `*` also
//! matches `/`.

use globset::{GlobBuilder, GlobMatcher};

use super::result::CompletionPair;

/// Matches candidates against the word being completed
pub struct PrefixMatcher {
    prefix: String,
    glob: Option<GlobMatcher>,
}

impl PrefixMatcher {
    /// Build a matcher for `word`
    ///
    /// A word that is not a valid glob (for example `[ab`) falls back to a
    /// literal prefix comparison.
    pub fn new(word: &str) -> Self {
        let pattern = format!("{}*", escape_braces(word));
        let glob = GlobBuilder::new(&pattern)
            .literal_separator(false)
            .backslash_escape(true)
            .build()
            .map(|glob| glob.compile_matcher());

        if let Err(err) = &glob {
            tracing::debug!(word, %err, "current word is not a glob, matching literally");
        }

        Self {
            prefix: word.to_string(),
            glob: glob.ok(),
        }
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        match &self.glob {
            Some(glob) => glob.is_match(candidate),
            None => candidate.starts_with(&self.prefix),
        }
    }
}

/// `{` and `}` have no meaning in `fnmatch`; keep them literal
fn escape_braces(word: &str) -> String {
    let mut escaped = String::with_capacity(word.len());
    for ch in word.chars() {
        match ch {
            '{' | '}' => {
                escaped.push('[');
                escaped.push(ch);
                escaped.push(']');
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Keep the values matching `current_word`, preserving order
pub fn filter(candidates: &[String], current_word: &str) -> Vec<String> {
    let matcher = PrefixMatcher::new(current_word);
    candidates
        .iter()
        .filter(|c| matcher.is_match(c))
        .cloned()
        .collect()
}

/// Keep the pairs whose value matches `current_word`, preserving order
pub fn filter_pairs(candidates: Vec<CompletionPair>, current_word: &str) -> Vec<CompletionPair> {
    let matcher = PrefixMatcher::new(current_word);
    candidates
        .into_iter()
        .filter(|c| matcher.is_match(&c.value))
        .collect()
}
