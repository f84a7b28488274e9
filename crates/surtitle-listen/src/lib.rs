//! # surtitle-listen
//!
//! Recognizer supervision for the surtitle engine.
//!
//! A [`Recognizer`] pushes transcript fragments through a
//! [`TranscriptSink`] into a bounded channel. The
//! [`ListeningSupervisor`] is the single consumer of that channel: it
//! forwards fragments to the shared [`Tracker`](surtitle_core::Tracker),
//! restarts the recognizer when a session ends, and discards anything
//! that arrives from a session it has already stopped.
//!
//! [`ReplayRecognizer`] plays back a recorded transcript and
//! [`CueLogger`] records line changes as JSONL.

pub mod cue_log;
pub mod recognizer;
pub mod replay;
pub mod supervisor;

pub use cue_log::CueLogger;
pub use recognizer::{Recognizer, RecognizerEvent, RecognizerEventKind, TranscriptSink};
pub use replay::{ReplayItem, ReplayRecognizer, parse_transcript};
pub use supervisor::{
    EventOutcome, ListenCommand, ListeningSupervisor, SupervisorHandle, SupervisorState,
    SupervisorStatus,
};
