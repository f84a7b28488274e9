//! Transcript replay recognizer.
//!
//! Plays back a recorded transcript as if it were live recognizer
//! output. Used by the CLI for rehearsal runs and by tests.
//!
//! Transcript format, one item per line:
//!
//! ```text
//! # comment
//! who's there
//! who's there nay answer me
//! ---
//! stand and unfold yourself
//! ```
//!
//! Each line is one fragment (the utterance as recognized so far). A
//! `---` line ends the recognizer session, so the supervisor restarts
//! it. Blank lines and `#` comments are skipped.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use surtitle_types::{Result, SurtitleError};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::recognizer::{Recognizer, TranscriptSink};

/// Session boundary marker.
pub const SESSION_BREAK: &str = "---";

/// One parsed transcript item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayItem {
    Fragment(String),
    End,
}

/// Parse transcript text. Trailing session breaks are dropped: the end
/// of the transcript is signalled through completion instead.
pub fn parse_transcript(text: &str) -> Vec<ReplayItem> {
    let mut items: Vec<ReplayItem> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| {
            if l == SESSION_BREAK {
                ReplayItem::End
            } else {
                ReplayItem::Fragment(l.to_owned())
            }
        })
        .collect();
    while items.last() == Some(&ReplayItem::End) {
        items.pop();
    }
    items
}

/// A [`Recognizer`] that replays a fixed transcript.
///
/// Playback position survives restarts: after a `---` the next session
/// continues from the following fragment.
pub struct ReplayRecognizer {
    items: Arc<Vec<ReplayItem>>,
    position: Arc<AtomicUsize>,
    interval: Duration,
    done: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl ReplayRecognizer {
    pub fn new(items: Vec<ReplayItem>) -> Self {
        Self {
            items: Arc::new(items),
            position: Arc::new(AtomicUsize::new(0)),
            interval: Duration::ZERO,
            done: Arc::new(Notify::new()),
            task: None,
        }
    }

    pub fn from_transcript(text: &str) -> Self {
        Self::new(parse_transcript(text))
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Self::from_transcript(&text))
    }

    /// Delay before each fragment.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Notified once every item has been delivered.
    pub fn completion(&self) -> Arc<Notify> {
        Arc::clone(&self.done)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items not yet delivered.
    pub fn remaining(&self) -> usize {
        self.items
            .len()
            .saturating_sub(self.position.load(Ordering::Acquire))
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[async_trait]
impl Recognizer for ReplayRecognizer {
    fn name(&self) -> &str {
        "replay"
    }

    async fn start(&mut self, sink: TranscriptSink) -> Result<()> {
        if self.remaining() == 0 {
            self.done.notify_one();
            return Err(SurtitleError::RecognizerUnavailable {
                reason: "replay transcript exhausted".into(),
            });
        }
        self.abort();

        let items = Arc::clone(&self.items);
        let position = Arc::clone(&self.position);
        let done = Arc::clone(&self.done);
        let interval = self.interval;

        self.task = Some(tokio::spawn(async move {
            loop {
                let index = position.load(Ordering::Acquire);
                let Some(item) = items.get(index) else {
                    debug!(epoch = sink.epoch(), "replay finished");
                    done.notify_one();
                    return;
                };
                match item {
                    ReplayItem::Fragment(text) => {
                        if !interval.is_zero() {
                            tokio::time::sleep(interval).await;
                        }
                        if sink.transcript(text.as_str()).await.is_err() {
                            return;
                        }
                        position.store(index + 1, Ordering::Release);
                    }
                    ReplayItem::End => {
                        position.store(index + 1, Ordering::Release);
                        let _ = sink.ended().await;
                        return;
                    }
                }
            }
        }));
        Ok(())
    }

    async fn stop(&mut self) {
        self.abort();
    }
}

impl Drop for ReplayRecognizer {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::RecognizerEventKind;
    use tokio::sync::mpsc;

    const TRANSCRIPT: &str = "\
# Act one
who's there

nay answer me
---
stand and unfold
---
";

    #[test]
    fn parses_fragments_breaks_and_comments() {
        assert_eq!(
            parse_transcript(TRANSCRIPT),
            vec![
                ReplayItem::Fragment("who's there".into()),
                ReplayItem::Fragment("nay answer me".into()),
                ReplayItem::End,
                ReplayItem::Fragment("stand and unfold".into()),
            ]
        );
        assert!(parse_transcript("# only comments\n\n").is_empty());
    }

    #[tokio::test]
    async fn replays_until_session_break() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut replay = ReplayRecognizer::from_transcript(TRANSCRIPT);
        assert_eq!(replay.len(), 4);

        let sink = TranscriptSink::new(1, tx.clone());
        replay.start(sink).await.unwrap();
        let kinds: Vec<_> = [rx.recv().await, rx.recv().await, rx.recv().await]
            .into_iter()
            .map(|e| e.unwrap().kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                RecognizerEventKind::Transcript("who's there".into()),
                RecognizerEventKind::Transcript("nay answer me".into()),
                RecognizerEventKind::Ended,
            ]
        );
        assert_eq!(replay.remaining(), 1);

        // The next session resumes after the break.
        replay.start(TranscriptSink::new(2, tx)).await.unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.epoch, 2);
        assert_eq!(event.kind, RecognizerEventKind::Transcript("stand and unfold".into()));

        replay.completion().notified().await;
        assert_eq!(replay.remaining(), 0);
    }

    #[tokio::test]
    async fn exhausted_replay_refuses_to_start() {
        let (tx, _rx) = mpsc::channel(8);
        let mut replay = ReplayRecognizer::new(Vec::new());
        let err = replay.start(TranscriptSink::new(1, tx)).await.unwrap_err();
        assert!(matches!(err, SurtitleError::RecognizerUnavailable { .. }));
    }

    #[tokio::test]
    async fn stop_halts_playback() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut replay = ReplayRecognizer::from_transcript("one\ntwo\nthree")
            .with_interval(Duration::from_secs(60));

        replay.start(TranscriptSink::new(1, tx)).await.unwrap();
        replay.stop().await;
        drop(replay);
        // Task aborted before the first delay elapsed; its sink is gone.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn from_file_reads_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.txt");
        tokio::fs::write(&path, TRANSCRIPT).await.unwrap();
        let replay = ReplayRecognizer::from_file(&path).await.unwrap();
        assert_eq!(replay.remaining(), 4);
    }
}
