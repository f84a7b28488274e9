//! # surtitle-types
//!
//! Core type definitions for the surtitle live captioning engine.
//!
//! This crate is the foundation of the dependency graph -- all other
//! surtitle crates depend on it. It contains:
//!
//! - **[`error`]** -- [`SurtitleError`] and the crate-wide [`Result`] alias
//! - **[`script`]** -- [`ScriptLine`] and the validated, ordered [`Script`]
//! - **[`config`]** -- Alignment and listening configuration schema
//! - **[`event`]** -- Cue change events and the renderer-facing snapshot

pub mod config;
pub mod error;
pub mod event;
pub mod script;

pub use config::{AlignmentConfig, ListenConfig, SurtitleConfig};
pub use error::{Result, SurtitleError};
pub use event::{CueCause, CueEvent, SurtitleSnapshot, Trigger};
pub use script::{Script, ScriptLine};
