//! Entry and exit zones.
//!
//! A line's entry zone is its first few tokens, its exit zone its last
//! few. Hearing enough of either is evidence that the performer has
//! reached a line boundary.

/// Borrowed entry / exit zones of a token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zones<'a> {
    pub entry: &'a [String],
    pub exit: &'a [String],
}

/// Split `tokens` into zones of up to `width` tokens.
///
/// Sequences shorter than `width` yield the whole sequence for both zones.
pub fn zones(tokens: &[String], width: usize) -> Zones<'_> {
    Zones {
        entry: entry_zone(tokens, width),
        exit: exit_zone(tokens, width),
    }
}

pub fn entry_zone(tokens: &[String], width: usize) -> &[String] {
    &tokens[..width.min(tokens.len())]
}

pub fn exit_zone(tokens: &[String], width: usize) -> &[String] {
    &tokens[tokens.len().saturating_sub(width)..]
}
