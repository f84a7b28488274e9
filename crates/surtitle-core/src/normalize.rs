//! Text normalization.
//!
//! Script lines and transcript fragments are both reduced to the same
//! canonical form before comparison: lowercase, a fixed punctuation set
//! removed, whitespace collapsed.

/// Characters removed before tokenizing.
///
/// Apostrophes, quotes and question marks are kept so contractions
/// ("don't") survive as single tokens.
pub const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`',
    '~', '(', ')',
];

/// Normalize raw text into word tokens.
///
/// Pure and deterministic. Empty or punctuation-only input yields an
/// empty sequence.
pub fn normalize(text: &str) -> Vec<String> {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    stripped.split_whitespace().map(str::to_owned).collect()
}

/// Normalize and re-join with single spaces.
pub fn normalize_text(text: &str) -> String {
    normalize(text).join(" ")
}
