//! # surtitle-core
//!
//! Streaming alignment engine for live surtitles.
//!
//! Given a continuously revised transcript of a performer's speech, the
//! engine decides when the displayed script line should advance. The
//! pieces, leaves first:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`normalize`] | Canonical token sequences from raw text |
//! | [`zones`] | Entry / exit zones of a line |
//! | [`window`] | Bounded recent-speech window |
//! | [`store`] | Script plus cursor |
//! | [`engine`] | Trigger evaluation and single-step advancement |
//! | [`tracker`] | Serialized shared state, manual control, observation |

pub mod engine;
pub mod normalize;
pub mod store;
pub mod tracker;
pub mod window;
pub mod zones;

pub use engine::{AlignmentEngine, Evaluation, SkipReason, decide};
pub use normalize::{normalize, normalize_text};
pub use store::ScriptStore;
pub use tracker::Tracker;
pub use window::RecentSpeechWindow;
pub use zones::{Zones, zones};
