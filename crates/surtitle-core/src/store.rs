//! Script store: the loaded script and the cursor into it.

use surtitle_types::{Script, ScriptLine};

/// Holds the immutable script and the current-line cursor.
///
/// `cursor == None` means no line is active (no script loaded, or the
/// operator blanked the titles before the first line).
#[derive(Debug, Clone, Default)]
pub struct ScriptStore {
    script: Script,
    cursor: Option<usize>,
}

impl ScriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the script. The cursor moves to the first line, or to
    /// `None` when the script is empty.
    pub fn load(&mut self, script: Script) {
        self.cursor = if script.is_empty() { None } else { Some(0) };
        self.script = script;
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&ScriptLine> {
        self.script.get(index)
    }

    pub fn current_line(&self) -> Option<&ScriptLine> {
        self.cursor.and_then(|c| self.script.get(c))
    }

    pub fn next_line(&self) -> Option<&ScriptLine> {
        self.cursor.and_then(|c| self.script.get(c + 1))
    }

    /// Whether the cursor sits on the final line.
    pub fn at_last_line(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 >= self.script.len())
    }

    /// Move the cursor to `index`, clamped to `[-1, len - 1]`.
    /// Negative values (and any index on an empty script) clear it.
    pub fn set_cursor(&mut self, index: isize) -> Option<usize> {
        self.cursor = if index < 0 || self.script.is_empty() {
            None
        } else {
            Some((index as usize).min(self.script.len() - 1))
        };
        self.cursor
    }

    /// Operator "next": from no line to the first, otherwise one forward,
    /// stopping at the last line.
    pub fn advance(&mut self) -> Option<usize> {
        if self.script.is_empty() {
            return None;
        }
        self.cursor = Some(match self.cursor {
            None => 0,
            Some(c) => (c + 1).min(self.script.len() - 1),
        });
        self.cursor
    }

    /// Operator "previous": one back, stopping at the first line. From
    /// no line it lands on the first line, like "next" does.
    pub fn retreat(&mut self) -> Option<usize> {
        if self.script.is_empty() {
            return None;
        }
        self.cursor = Some(self.cursor.map_or(0, |c| c.saturating_sub(1)));
        self.cursor
    }

    /// Automatic single-step advance. Returns the new index, or `None`
    /// when there is no next line.
    pub(crate) fn step_forward(&mut self) -> Option<usize> {
        let next = self.cursor? + 1;
        if next >= self.script.len() {
            return None;
        }
        self.cursor = Some(next);
        Some(next)
    }
}
