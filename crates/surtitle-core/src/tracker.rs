//! Shared alignment state.
//!
//! [`Tracker`] owns the [`ScriptStore`] and the [`AlignmentEngine`] behind
//! a single mutex, so automatic advancement and operator navigation can
//! never interleave. Every change is published while the lock is held:
//! snapshots on a `watch` channel, cursor changes on a `broadcast` channel.

use parking_lot::Mutex;
use surtitle_types::{AlignmentConfig, CueCause, CueEvent, Result, Script, SurtitleSnapshot};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::engine::{AlignmentEngine, Evaluation, SkipReason};
use crate::store::ScriptStore;

/// Buffered cue events per subscriber before the oldest are dropped.
const CUE_CHANNEL_CAPACITY: usize = 256;

struct TrackerState {
    store: ScriptStore,
    engine: AlignmentEngine,
    blackout: bool,
}

impl TrackerState {
    fn snapshot(&self) -> SurtitleSnapshot {
        SurtitleSnapshot {
            cursor: self.store.cursor(),
            total_lines: self.store.len(),
            current_line: self.store.current_line().cloned(),
            next_line: self.store.next_line().cloned(),
            listening: self.engine.is_listening(),
            blackout: self.blackout,
            last_recognized: self.engine.last_recognized().to_owned(),
        }
    }

    fn cue(&self, from: Option<usize>, cause: CueCause) -> CueEvent {
        let to = self.store.cursor();
        let line_id = self.store.current_line().map(|l| l.id.clone());
        CueEvent::new(from, to, line_id, cause)
    }
}

/// Serialized script, cursor and engine state.
///
/// Designed to be shared behind an `Arc` by the listening supervisor, the
/// operator controls and any number of renderers.
pub struct Tracker {
    state: Mutex<TrackerState>,
    snapshots: watch::Sender<SurtitleSnapshot>,
    cues: broadcast::Sender<CueEvent>,
}

impl Tracker {
    pub fn new(config: AlignmentConfig) -> Self {
        let state = TrackerState {
            store: ScriptStore::new(),
            engine: AlignmentEngine::new(config),
            blackout: false,
        };
        let (snapshots, _) = watch::channel(state.snapshot());
        let (cues, _) = broadcast::channel(CUE_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(state),
            snapshots,
            cues,
        }
    }

    // ── Script ───────────────────────────────────────────────────────

    /// Replace the script and move to its first line.
    ///
    /// Clears the window and the last recognized text; the listening flag
    /// is left as it was.
    pub fn load(&self, script: Script) -> Option<usize> {
        let mut state = self.state.lock();
        let from = state.store.cursor();
        let lines = script.len();
        state.store.load(script);
        state.engine.reset_window();
        state.engine.clear_last_recognized();
        info!(lines, "script loaded");

        let cue = state.cue(from, CueCause::Loaded);
        self.publish(&state, Some(cue));
        state.store.cursor()
    }

    /// Parse and load a JSON script. Nothing changes if parsing fails.
    pub fn load_json(&self, json: &str) -> Result<usize> {
        let script = Script::from_json(json)?;
        let lines = script.len();
        self.load(script);
        Ok(lines)
    }

    // ── Speech ───────────────────────────────────────────────────────

    /// Evaluate one transcript fragment.
    pub fn ingest(&self, fragment: &str) -> Evaluation {
        let mut state = self.state.lock();
        let from = state.store.cursor();
        let state = &mut *state;
        let evaluation = state.engine.evaluate(&mut state.store, fragment);

        match evaluation {
            Evaluation::Skipped(SkipReason::NotListening | SkipReason::EmptyFragment) => {}
            Evaluation::Advanced { trigger, .. } => {
                let cue = state.cue(from, CueCause::Auto { trigger });
                self.publish(state, Some(cue));
            }
            _ => self.publish(state, None),
        }
        evaluation
    }

    // ── Operator control ─────────────────────────────────────────────

    /// Move to the next line (from no line, to the first).
    pub fn advance(&self) -> Option<usize> {
        self.navigate("advance", ScriptStore::advance)
    }

    /// Move to the previous line, stopping at the first.
    pub fn retreat(&self) -> Option<usize> {
        self.navigate("retreat", ScriptStore::retreat)
    }

    /// Jump to `index`, clamped to the script. Negative clears the cursor.
    pub fn jump_to(&self, index: isize) -> Option<usize> {
        self.navigate("jump", |store| store.set_cursor(index))
    }

    fn navigate(
        &self,
        action: &str,
        op: impl FnOnce(&mut ScriptStore) -> Option<usize>,
    ) -> Option<usize> {
        let mut state = self.state.lock();
        let from = state.store.cursor();
        let to = op(&mut state.store);
        state.engine.reset_window();

        let cue = (from != to).then(|| state.cue(from, CueCause::Manual));
        if cue.is_some() {
            info!(action, from = ?from, to = ?to, "cursor moved manually");
        }
        self.publish(&state, cue);
        to
    }

    pub fn set_listening(&self, listening: bool) {
        let mut state = self.state.lock();
        state.engine.set_listening(listening);
        debug!(listening, "listening flag set");
        self.publish(&state, None);
    }

    /// Forget recently heard speech, e.g. after a recognizer restart.
    pub fn reset_window(&self) {
        self.state.lock().engine.reset_window();
    }

    pub fn set_blackout(&self, blackout: bool) {
        let mut state = self.state.lock();
        state.blackout = blackout;
        self.publish(&state, None);
    }

    /// Flip blackout and return the new value.
    pub fn toggle_blackout(&self) -> bool {
        let mut state = self.state.lock();
        state.blackout = !state.blackout;
        info!(blackout = state.blackout, "blackout toggled");
        self.publish(&state, None);
        state.blackout
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> SurtitleSnapshot {
        self.state.lock().snapshot()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.state.lock().store.cursor()
    }

    pub fn is_listening(&self) -> bool {
        self.state.lock().engine.is_listening()
    }

    /// Number of tokens currently in the recent-speech window.
    pub fn window_len(&self) -> usize {
        self.state.lock().engine.window().len()
    }

    /// Latest-value stream of snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SurtitleSnapshot> {
        self.snapshots.subscribe()
    }

    /// Stream of cursor changes.
    pub fn subscribe_cues(&self) -> broadcast::Receiver<CueEvent> {
        self.cues.subscribe()
    }

    fn publish(&self, state: &TrackerState, cue: Option<CueEvent>) {
        self.snapshots.send_replace(state.snapshot());
        if let Some(cue) = cue {
            // No subscribers is fine.
            let _ = self.cues.send(cue);
        }
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(AlignmentConfig::default())
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Tracker")
            .field("cursor", &state.store.cursor())
            .field("lines", &state.store.len())
            .field("listening", &state.engine.is_listening())
            .field("blackout", &state.blackout)
            .finish()
    }
}
