//! Error types for the surtitle engine.
//!
//! Provides [`SurtitleError`] as the single error type shared by every
//! crate in the workspace. It is non-exhaustive to allow future extension
//! without breaking downstream.

use thiserror::Error;

/// Top-level error type for the surtitle engine.
///
/// Variants are grouped into ingestion errors (the script was rejected and
/// nothing was applied), listening errors (the recognizer could not be
/// acquired, alignment state is untouched) and plumbing errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SurtitleError {
    // ── Ingestion ────────────────────────────────────────────────────

    /// The script is structurally unusable.
    #[error("invalid script: {reason}")]
    ScriptInvalid {
        /// What is wrong with the script.
        reason: String,
    },

    /// Two lines share the same identifier.
    #[error("duplicate line id: {id}")]
    DuplicateLineId {
        /// The repeated identifier.
        id: String,
    },

    /// A line has an empty (or whitespace-only) identifier.
    #[error("line {index} has an empty id")]
    EmptyLineId {
        /// Zero-based position of the offending line.
        index: usize,
    },

    // ── Listening ────────────────────────────────────────────────────

    /// The speech recognizer could not be started.
    #[error("recognizer unavailable: {reason}")]
    RecognizerUnavailable {
        /// Recognizer-supplied failure description.
        reason: String,
    },

    // ── Plumbing ─────────────────────────────────────────────────────

    /// Configuration is malformed or semantically invalid.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// A control or event channel was closed.
    #[error("channel error: {0}")]
    Channel(String),

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SurtitleError {
    /// Whether this error came from script ingestion.
    pub fn is_ingestion(&self) -> bool {
        matches!(
            self,
            Self::ScriptInvalid { .. }
                | Self::DuplicateLineId { .. }
                | Self::EmptyLineId { .. }
                | Self::Json(_)
        )
    }
}

/// A convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SurtitleError>;
