//! Title normalization used to build and match guessable words.
//!
//! [`clean_text`] is the full pipeline. The individual steps are public so the
//! masked rendering of [`GuessState`](crate::game::GuessState) can reuse the ones it needs.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Suffix markers after which a title carries no guessable words.
pub const SUFFIX_MARKERS: [&str; 3] = ["-", "feat.", "feature"];

/// Cuts the string at its first `(` when a `)` follows somewhere after it.
///
/// An opening parenthesis without any closing one leaves the string as is.
pub fn remove_parenthesis(s: &str) -> String {
    match s.split_once('(') {
        Some((before, rest)) if rest.contains(')') => before.to_string(),
        _ => s.to_string(),
    }
}

/// Keeps only what precedes the first occurrence of `marker`.
pub fn remove_after(s: &str, marker: &str) -> String {
    match s.find(marker) {
        Some(idx) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Lowercases and replaces every character that is not a letter or a digit
/// with a single space.
pub fn remove_symbols(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

/// Canonically decomposes the string and drops the combining marks.
pub fn remove_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

pub fn clean_text(s: &str) -> String {
    let mut cleaned = remove_parenthesis(&s.to_lowercase());
    for marker in SUFFIX_MARKERS {
        cleaned = remove_after(&cleaned, marker);
    }
    remove_accents(&remove_symbols(&cleaned))
}

/// Guessable words of `s`: the cleaned text split on whitespace.
pub fn words(s: &str) -> Vec<String> {
    clean_text(s)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Lookup key of a run of letters and digits taken verbatim from a title.
pub(crate) fn word_key(run: &str) -> String {
    remove_accents(&run.to_lowercase())
}
