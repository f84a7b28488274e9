//! Script types.
//!
//! A [`Script`] is the ordered, immutable list of [`ScriptLine`]s produced by
//! the external document converter. Construction validates identifiers and
//! is all-or-nothing: a rejected script never reaches the alignment engine.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurtitleError};

/// A single surtitle line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    /// Identifier, unique within the script.
    pub id: String,

    /// Display text.
    pub text: String,

    /// Character speaking the line, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,

    /// Operator annotation (cue notes, blocking hints).
    #[serde(default, alias = "annotation", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ScriptLine {
    /// Create a line with no speaker or note.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            speaker: None,
            note: None,
        }
    }

    /// Attach a speaker label.
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Attach an annotation.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Ordered script in performance order.
///
/// Invariants: no identifier is empty and no two lines share one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Script {
    lines: Vec<ScriptLine>,
}

impl Script {
    /// Validate and wrap a list of lines.
    pub fn new(lines: Vec<ScriptLine>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            if line.id.trim().is_empty() {
                return Err(SurtitleError::EmptyLineId { index });
            }
            if !seen.insert(line.id.as_str()) {
                return Err(SurtitleError::DuplicateLineId {
                    id: line.id.clone(),
                });
            }
        }
        Ok(Self { lines })
    }

    /// Parse the converter's JSON output: an array of
    /// `{ "id", "text", "speaker"?, "note"? }` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_array() {
            return Err(SurtitleError::ScriptInvalid {
                reason: "expected a JSON array of lines".into(),
            });
        }
        let lines: Vec<ScriptLine> = serde_json::from_value(value)?;
        Self::new(lines)
    }

    /// Build a script from bare texts, numbering ids `line-001`, `line-002`, ...
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| ScriptLine::new(format!("line-{:03}", i + 1), text))
            .collect();
        Self { lines }
    }

    /// Serialize back to the converter's JSON shape.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.lines)?)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Bounds-checked line lookup.
    pub fn get(&self, index: usize) -> Option<&ScriptLine> {
        self.lines.get(index)
    }

    /// Position of the line with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScriptLine> {
        self.lines.iter()
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let lines = Vec::<ScriptLine>::deserialize(deserializer)?;
        Script::new(lines).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a Script {
    type Item = &'a ScriptLine;
    type IntoIter = std::slice::Iter<'a, ScriptLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
