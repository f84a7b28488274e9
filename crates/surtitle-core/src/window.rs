//! Recent-speech window.

use std::collections::VecDeque;

/// The last `capacity` normalized tokens of the current utterance.
///
/// Each observed fragment replaces the window rather than extending it:
/// recognizers revise earlier words, so only the latest fragment is
/// authoritative.
#[derive(Debug, Clone)]
pub struct RecentSpeechWindow {
    capacity: usize,
    tokens: VecDeque<String>,
}

impl RecentSpeechWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            tokens: VecDeque::with_capacity(capacity),
        }
    }

    /// Replace the window with the trailing tokens of `tokens`.
    pub fn observe(&mut self, tokens: Vec<String>) {
        let skip = tokens.len().saturating_sub(self.capacity);
        self.tokens.clear();
        self.tokens.extend(tokens.into_iter().skip(skip));
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// How many entries of `zone` occur anywhere in the window.
    ///
    /// Order-insensitive; a token repeated in the zone counts each time.
    pub fn count_present(&self, zone: &[String]) -> usize {
        zone.iter().filter(|t| self.contains(t)).count()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
