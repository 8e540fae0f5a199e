//! Text normalization shared by every lexical comparison in the scorer.

use std::sync::OnceLock;

use regex::Regex;

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

/// Letters and every numeric category (so `²` and `½` count), plus underscore.
/// Combining marks are not word characters.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Unicode whitespace plus the ASCII information separators U+001C..=U+001F.
fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

/// Lowercases, drops every character that is neither a word character nor whitespace,
/// then collapses whitespace runs into a single space.
///
/// Underscore counts as a word character and survives. Symbols are dropped without
/// splitting, so "C++" becomes "c" and "node.js" becomes "nodejs".
pub fn normalize(text: &str) -> String {
    let whitespace = WHITESPACE_RE
        .get_or_init(|| Regex::new(r"[\s\x1C-\x1F]+").expect("whitespace regex"));

    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|&c| is_word_char(c) || is_space(c))
        .collect();
    whitespace.replace_all(&stripped, " ").into_owned()
}
