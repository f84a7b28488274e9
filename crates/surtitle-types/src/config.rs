//! Configuration schema types.
//!
//! All structs accept both `snake_case` and `camelCase` field names in JSON
//! via `#[serde(alias)]`. Missing fields fall back to the reference
//! defaults; unknown fields are silently ignored for forward compatibility.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurtitleError};

/// Shared default function: returns `true`.
pub(crate) fn default_true() -> bool {
    true
}

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration for the surtitle engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SurtitleConfig {
    /// Alignment heuristics.
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Recognizer supervision.
    #[serde(default)]
    pub listen: ListenConfig,
}

impl SurtitleConfig {
    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.alignment.validate()?;
        self.listen.validate()
    }
}

// ── Alignment ────────────────────────────────────────────────────────────

/// Tuning for the alignment engine's advancement triggers.
///
/// Defaults are the empirically tuned reference values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlignmentConfig {
    /// Number of most recent spoken tokens kept in the window.
    #[serde(default = "default_window_tokens", alias = "windowTokens")]
    pub window_tokens: usize,

    /// Width of a line's entry and exit zones, in tokens.
    #[serde(default = "default_zone_tokens", alias = "zoneTokens")]
    pub zone_tokens: usize,

    /// Entry-zone tokens that must be heard to advance.
    #[serde(default = "default_threshold", alias = "entryThreshold")]
    pub entry_threshold: usize,

    /// Exit-zone tokens that must be heard to advance.
    #[serde(default = "default_threshold", alias = "exitThreshold")]
    pub exit_threshold: usize,

    /// Lines with at most this many tokens never fire the exit trigger.
    #[serde(default = "default_short_line_tokens", alias = "shortLineTokens")]
    pub short_line_tokens: usize,
}

fn default_window_tokens() -> usize {
    15
}
fn default_zone_tokens() -> usize {
    3
}
fn default_threshold() -> usize {
    2
}
fn default_short_line_tokens() -> usize {
    3
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            window_tokens: default_window_tokens(),
            zone_tokens: default_zone_tokens(),
            entry_threshold: default_threshold(),
            exit_threshold: default_threshold(),
            short_line_tokens: default_short_line_tokens(),
        }
    }
}

impl AlignmentConfig {
    /// Reject settings under which a trigger could fire on no evidence or
    /// could never fire at all.
    pub fn validate(&self) -> Result<()> {
        if self.window_tokens == 0 {
            return Err(invalid("alignment.window_tokens must be at least 1"));
        }
        if self.zone_tokens == 0 {
            return Err(invalid("alignment.zone_tokens must be at least 1"));
        }
        for (name, value) in [
            ("entry_threshold", self.entry_threshold),
            ("exit_threshold", self.exit_threshold),
        ] {
            if value == 0 || value > self.zone_tokens {
                return Err(invalid(format!(
                    "alignment.{name} must be between 1 and zone_tokens ({}), got {value}",
                    self.zone_tokens
                )));
            }
        }
        Ok(())
    }
}

// ── Listening ────────────────────────────────────────────────────────────

/// Recognizer supervision settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListenConfig {
    /// Restart the recognizer when it ends while listening is still on.
    #[serde(default = "default_true", alias = "autoRestart")]
    pub auto_restart: bool,

    /// Restart attempts made in a row before giving up. Must be at least
    /// 1 while `auto_restart` is on.
    #[serde(default = "default_max_restart_attempts", alias = "maxRestartAttempts")]
    pub max_restart_attempts: u32,

    /// Delay between failed restart attempts, in milliseconds.
    #[serde(default = "default_restart_backoff_ms", alias = "restartBackoffMs")]
    pub restart_backoff_ms: u64,

    /// Capacity of the bounded transcript event channel.
    #[serde(default = "default_event_capacity", alias = "eventCapacity")]
    pub event_capacity: usize,
}

fn default_max_restart_attempts() -> u32 {
    3
}
fn default_restart_backoff_ms() -> u64 {
    250
}
fn default_event_capacity() -> usize {
    64
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            auto_restart: true,
            max_restart_attempts: default_max_restart_attempts(),
            restart_backoff_ms: default_restart_backoff_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl ListenConfig {
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(invalid("listen.event_capacity must be at least 1"));
        }
        if self.auto_restart && self.max_restart_attempts == 0 {
            return Err(invalid(
                "listen.max_restart_attempts must be at least 1 when auto_restart is on",
            ));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> SurtitleError {
    SurtitleError::ConfigInvalid {
        reason: reason.into(),
    }
}
