//! Observable alignment state.
//!
//! [`CueEvent`] is emitted every time the displayed line changes;
//! [`SurtitleSnapshot`] is the read-only state exposed to renderers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::script::ScriptLine;

/// Which advancement detector fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The next line's opening words were heard.
    Entry,
    /// The current line's closing words were heard.
    Exit,
    /// Both detectors fired on the same window.
    Both,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::Exit => write!(f, "exit"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// Why the cursor moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CueCause {
    /// The alignment engine advanced on recognized speech.
    Auto { trigger: Trigger },
    /// The operator moved the cursor.
    Manual,
    /// A script was loaded.
    Loaded,
}

impl std::fmt::Display for CueCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto { trigger } => write!(f, "auto:{trigger}"),
            Self::Manual => write!(f, "manual"),
            Self::Loaded => write!(f, "loaded"),
        }
    }
}

/// A change of the displayed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueEvent {
    /// Cursor before the change (`None` = no line active).
    pub from: Option<usize>,
    /// Cursor after the change.
    pub to: Option<usize>,
    /// Id of the line now displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,
    pub cause: CueCause,
    pub at: DateTime<Utc>,
}

impl CueEvent {
    /// Create an event stamped with the current time.
    pub fn new(
        from: Option<usize>,
        to: Option<usize>,
        line_id: Option<String>,
        cause: CueCause,
    ) -> Self {
        Self {
            from,
            to,
            line_id,
            cause,
            at: Utc::now(),
        }
    }
}

/// Renderer-facing view of the alignment state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurtitleSnapshot {
    /// Current line index (`None` = no line active).
    pub cursor: Option<usize>,
    pub total_lines: usize,
    pub current_line: Option<ScriptLine>,
    /// Upcoming line, for operator preview.
    pub next_line: Option<ScriptLine>,
    pub listening: bool,
    /// Titles are hidden without losing position.
    pub blackout: bool,
    /// Latest raw transcript fragment.
    pub last_recognized: String,
}

impl SurtitleSnapshot {
    /// The line a projector should show right now.
    pub fn display_line(&self) -> Option<&ScriptLine> {
        if self.blackout {
            None
        } else {
            self.current_line.as_ref()
        }
    }

    /// Signed cursor position, `-1` when no line is active.
    pub fn position(&self) -> i64 {
        self.cursor.map_or(-1, |c| c as i64)
    }
}
