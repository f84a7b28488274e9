//! Recognizer boundary.
//!
//! A [`Recognizer`] turns live audio into text somewhere outside this
//! crate. It is handed a [`TranscriptSink`] on every start and pushes
//! fragments and lifecycle signals through it into the supervisor's
//! bounded event channel.

use async_trait::async_trait;
use surtitle_types::{Result, SurtitleError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// An external speech recognizer.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Short identifier for logs (e.g. `"replay"`).
    fn name(&self) -> &str;

    /// Begin a recognition session that reports through `sink`.
    ///
    /// Returns once the session is running. An error means no session
    /// was started and nothing will be sent on `sink`.
    async fn start(&mut self, sink: TranscriptSink) -> Result<()>;

    /// End the current session and release its resources. Must be
    /// safe to call when no session is running.
    async fn stop(&mut self);
}

/// What a recognizer reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEventKind {
    /// The current utterance as recognized so far. Supersedes earlier
    /// fragments.
    Transcript(String),
    /// The session ended on its own (silence timeout, stream closed).
    Ended,
    /// The session failed.
    Failed(String),
}

/// A recognizer report stamped with the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerEvent {
    pub epoch: u64,
    pub kind: RecognizerEventKind,
}

/// Producer handle given to a recognizer for one session.
///
/// Cloneable so callback-style recognizers can hand copies to several
/// threads. Every event is stamped with the session epoch, which lets the
/// supervisor drop late reports from a session it already stopped.
#[derive(Debug, Clone)]
pub struct TranscriptSink {
    epoch: u64,
    tx: mpsc::Sender<RecognizerEvent>,
}

impl TranscriptSink {
    pub fn new(epoch: u64, tx: mpsc::Sender<RecognizerEvent>) -> Self {
        Self { epoch, tx }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Send a fragment, waiting for channel capacity.
    pub async fn transcript(&self, text: impl Into<String>) -> Result<()> {
        self.send(RecognizerEventKind::Transcript(text.into())).await
    }

    /// Send a fragment without waiting. Returns `false` if the channel
    /// is full or closed; the next fragment supersedes a dropped one.
    pub fn try_transcript(&self, text: impl Into<String>) -> bool {
        let event = RecognizerEvent {
            epoch: self.epoch,
            kind: RecognizerEventKind::Transcript(text.into()),
        };
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::trace!(epoch = self.epoch, "event channel full, fragment dropped");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Report that the session ended on its own.
    pub async fn ended(&self) -> Result<()> {
        self.send(RecognizerEventKind::Ended).await
    }

    /// Report that the session failed.
    pub async fn failed(&self, reason: impl Into<String>) -> Result<()> {
        self.send(RecognizerEventKind::Failed(reason.into())).await
    }

    /// Whether the supervisor side is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, kind: RecognizerEventKind) -> Result<()> {
        self.tx
            .send(RecognizerEvent {
                epoch: self.epoch,
                kind,
            })
            .await
            .map_err(|_| SurtitleError::Channel("recognizer event channel closed".into()))
    }
}
