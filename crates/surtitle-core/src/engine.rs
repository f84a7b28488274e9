//! Alignment engine.
//!
//! Consumes transcript fragments, keeps the recent-speech window, and
//! advances the script cursor by one line when either the current line's
//! closing words or the next line's opening words have been heard.

use surtitle_types::{AlignmentConfig, Trigger};
use tracing::{debug, info};

use crate::normalize::normalize;
use crate::store::ScriptStore;
use crate::window::RecentSpeechWindow;
use crate::zones::{entry_zone, exit_zone};

/// Why an evaluation did not look at the triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Listening is off; fragments are ignored entirely.
    NotListening,
    /// The fragment normalized to nothing.
    EmptyFragment,
    /// No line is active.
    NoActiveLine,
    /// The cursor is on the final line.
    AtLastLine,
}

/// Outcome of evaluating one transcript fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Skipped(SkipReason),
    /// Triggers were evaluated and neither fired.
    Held,
    /// The cursor moved forward one line.
    Advanced {
        from: usize,
        to: usize,
        trigger: Trigger,
    },
}

impl Evaluation {
    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}

/// Decide whether the window justifies leaving `current` for `next`.
///
/// Both inputs are normalized token sequences. The exit trigger is
/// suppressed for short current lines, whose exit zone overlaps their
/// entry zone and would fire the moment the line starts.
pub fn decide(
    current: &[String],
    next: &[String],
    window: &RecentSpeechWindow,
    config: &AlignmentConfig,
) -> Option<Trigger> {
    let entry_hits = window.count_present(entry_zone(next, config.zone_tokens));
    let exit_hits = window.count_present(exit_zone(current, config.zone_tokens));

    let entry = entry_hits >= config.entry_threshold;
    let exit = exit_hits >= config.exit_threshold && current.len() > config.short_line_tokens;

    match (entry, exit) {
        (true, true) => Some(Trigger::Both),
        (true, false) => Some(Trigger::Entry),
        (false, true) => Some(Trigger::Exit),
        (false, false) => None,
    }
}

/// Per-session alignment state. The cursor lives in the [`ScriptStore`].
#[derive(Debug, Clone)]
pub struct AlignmentEngine {
    config: AlignmentConfig,
    window: RecentSpeechWindow,
    listening: bool,
    last_recognized: String,
}

impl AlignmentEngine {
    pub fn new(config: AlignmentConfig) -> Self {
        Self {
            window: RecentSpeechWindow::new(config.window_tokens),
            config,
            listening: false,
            last_recognized: String::new(),
        }
    }

    pub fn window(&self) -> &RecentSpeechWindow {
        &self.window
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn last_recognized(&self) -> &str {
        &self.last_recognized
    }

    /// Turn listening on or off. Either way the window starts empty.
    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
        self.window.clear();
    }

    pub fn reset_window(&mut self) {
        self.window.clear();
    }

    pub fn clear_last_recognized(&mut self) {
        self.last_recognized.clear();
    }

    /// Evaluate one fragment against the store, advancing at most one line.
    pub fn evaluate(&mut self, store: &mut ScriptStore, fragment: &str) -> Evaluation {
        if !self.listening {
            return Evaluation::Skipped(SkipReason::NotListening);
        }

        let tokens = normalize(fragment);
        if tokens.is_empty() {
            return Evaluation::Skipped(SkipReason::EmptyFragment);
        }

        self.last_recognized.clear();
        self.last_recognized.push_str(fragment);
        self.window.observe(tokens);

        let Some(from) = store.cursor() else {
            return Evaluation::Skipped(SkipReason::NoActiveLine);
        };
        if store.at_last_line() {
            return Evaluation::Skipped(SkipReason::AtLastLine);
        }
        let (Some(current), Some(next)) = (store.current_line(), store.next_line()) else {
            return Evaluation::Skipped(SkipReason::AtLastLine);
        };

        let current_tokens = normalize(&current.text);
        let next_tokens = normalize(&next.text);

        let Some(trigger) = decide(&current_tokens, &next_tokens, &self.window, &self.config) else {
            debug!(cursor = from, window = self.window.len(), "holding line");
            return Evaluation::Held;
        };

        match store.step_forward() {
            Some(to) => {
                info!(from, to, %trigger, "advanced on speech");
                Evaluation::Advanced { from, to, trigger }
            }
            None => Evaluation::Skipped(SkipReason::AtLastLine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surtitle_types::Script;

    const KING: &str = "The king is dead, long live the king!";
    const CROWN: &str = "Bring forth the crown.";
    const CODA: &str = "Let trumpets sound across the land.";

    fn listening_engine() -> AlignmentEngine {
        let mut engine = AlignmentEngine::new(AlignmentConfig::default());
        engine.set_listening(true);
        engine
    }

    fn store_with(lines: &[&str]) -> ScriptStore {
        let mut store = ScriptStore::new();
        store.load(Script::from_texts(lines.iter().copied()));
        store
    }

    fn window_of(text: &str) -> RecentSpeechWindow {
        let mut window = RecentSpeechWindow::new(15);
        window.observe(normalize(text));
        window
    }

    #[test]
    fn exit_zone_match_advances_once() {
        let mut engine = listening_engine();
        let mut store = store_with(&[KING, CROWN, CODA]);

        let result = engine.evaluate(&mut store, "long live the");
        assert_eq!(
            result,
            Evaluation::Advanced {
                from: 0,
                to: 1,
                trigger: Trigger::Exit
            }
        );
        assert_eq!(store.cursor(), Some(1));
    }

    #[test]
    fn entry_zone_match_advances_without_exit_match() {
        let mut engine = listening_engine();
        let mut store = store_with(&[KING, CROWN, CODA]);

        let result = engine.evaluate(&mut store, "bring forth");
        assert_eq!(
            result,
            Evaluation::Advanced {
                from: 0,
                to: 1,
                trigger: Trigger::Entry
            }
        );
    }

    #[test]
    fn both_triggers_report_both() {
        let mut engine = listening_engine();
        let mut store = store_with(&[KING, CROWN]);
        let result = engine.evaluate(&mut store, "live the king bring forth");
        assert!(matches!(
            result,
            Evaluation::Advanced {
                trigger: Trigger::Both,
                ..
            }
        ));
    }

    #[test]
    fn single_token_matches_hold() {
        let mut engine = listening_engine();
        let mut store = store_with(&[KING, CROWN]);

        // One exit-zone token ("king") and one entry-zone token ("bring").
        assert_eq!(engine.evaluate(&mut store, "king bring"), Evaluation::Held);
        assert_eq!(store.cursor(), Some(0));
    }

    #[test]
    fn short_current_line_never_fires_exit() {
        let mut engine = listening_engine();
        let mut store = store_with(&["Away with him!", CROWN]);

        // All three exit-zone tokens heard, but the line has only 3 tokens.
        assert_eq!(
            engine.evaluate(&mut store, "away with him"),
            Evaluation::Held
        );
        // The entry trigger still works from a short line.
        assert!(engine.evaluate(&mut store, "bring forth").is_advanced());
    }

    #[test]
    fn rapid_qualifying_fragments_advance_one_step() {
        let mut engine = listening_engine();
        let mut store = store_with(&[KING, CROWN, CODA]);

        let advanced = (0..100)
            .map(|_| engine.evaluate(&mut store, "long live the"))
            .filter(Evaluation::is_advanced)
            .count();
        assert_eq!(advanced, 1);
        assert_eq!(store.cursor(), Some(1));
    }

    #[test]
    fn no_advance_at_last_line_or_without_cursor() {
        let mut engine = listening_engine();
        let mut store = store_with(&[KING, CROWN]);

        store.set_cursor(1);
        assert_eq!(
            engine.evaluate(&mut store, "bring forth the crown long live the king"),
            Evaluation::Skipped(SkipReason::AtLastLine)
        );
        assert_eq!(store.cursor(), Some(1));

        store.set_cursor(-1);
        assert_eq!(
            engine.evaluate(&mut store, "the king is dead bring forth"),
            Evaluation::Skipped(SkipReason::NoActiveLine)
        );
        assert_eq!(store.cursor(), None);
    }

    #[test]
    fn empty_script_has_no_active_line() {
        let mut engine = listening_engine();
        let mut store = ScriptStore::new();
        assert_eq!(
            engine.evaluate(&mut store, "anything at all"),
            Evaluation::Skipped(SkipReason::NoActiveLine)
        );
    }

    #[test]
    fn not_listening_is_a_no_op() {
        let mut engine = AlignmentEngine::new(AlignmentConfig::default());
        let mut store = store_with(&[KING, CROWN]);

        assert_eq!(
            engine.evaluate(&mut store, "bring forth"),
            Evaluation::Skipped(SkipReason::NotListening)
        );
        assert!(engine.window().is_empty());
        assert_eq!(engine.last_recognized(), "");
        assert_eq!(store.cursor(), Some(0));
    }

    #[test]
    fn empty_fragment_keeps_window_and_last_recognized() {
        let mut engine = listening_engine();
        let mut store = store_with(&[KING, CROWN, CODA]);

        engine.evaluate(&mut store, "the crown");
        assert_eq!(
            engine.evaluate(&mut store, " ... !! "),
            Evaluation::Skipped(SkipReason::EmptyFragment)
        );
        assert_eq!(engine.last_recognized(), "the crown");
        assert_eq!(engine.window().len(), 2);
    }

    #[test]
    fn fragment_replaces_window() {
        let mut engine = listening_engine();
        let mut store = store_with(&[KING, CROWN, CODA]);

        // "bring" then "forth" in separate utterances never co-occur.
        assert_eq!(engine.evaluate(&mut store, "bring"), Evaluation::Held);
        assert_eq!(engine.evaluate(&mut store, "forth"), Evaluation::Held);
        assert_eq!(store.cursor(), Some(0));
    }

    #[test]
    fn window_keeps_only_trailing_tokens() {
        let mut engine = listening_engine();
        let mut store = store_with(&[KING, CROWN, CODA]);

        // "bring forth" falls out of a 15-token window.
        let fragment = format!("bring forth {}", "la ".repeat(15));
        assert_eq!(engine.evaluate(&mut store, &fragment), Evaluation::Held);
        assert_eq!(engine.window().len(), 15);
    }

    #[test]
    fn set_listening_clears_window() {
        let mut engine = listening_engine();
        let mut store = store_with(&[KING, CROWN]);
        engine.evaluate(&mut store, "the crown");
        engine.set_listening(false);
        assert!(engine.window().is_empty());
        engine.set_listening(true);
        assert!(engine.window().is_empty());
    }

    #[test]
    fn thresholds_are_configurable() {
        let config = AlignmentConfig {
            entry_threshold: 3,
            exit_threshold: 3,
            ..AlignmentConfig::default()
        };
        let current = normalize(KING);
        let next = normalize(CROWN);

        let window = window_of("bring forth");
        assert_eq!(decide(&current, &next, &window, &config), None);
        assert_eq!(
            decide(&current, &next, &window_of("bring forth the"), &config),
            Some(Trigger::Entry)
        );
    }

    #[test]
    fn decide_counts_zone_tokens_in_any_order() {
        let config = AlignmentConfig::default();
        let current = normalize(KING);
        let next = normalize(CROWN);
        assert_eq!(
            decide(&current, &next, &window_of("king the"), &config),
            Some(Trigger::Exit)
        );
        assert_eq!(decide(&current, &next, &window_of("crown"), &config), None);
    }
}
