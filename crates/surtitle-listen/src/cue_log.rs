//! Cue logging.
//!
//! [`CueLogger`] appends every [`CueEvent`] to a JSONL file so a
//! performance's line changes can be reviewed afterwards.

use std::path::{Path, PathBuf};

use surtitle_types::{CueEvent, Result};
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Append-only JSONL log of cue events.
pub struct CueLogger {
    path: PathBuf,
}

impl CueLogger {
    /// Create a logger writing to `path`, creating parent directories.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self { path })
    }

    pub async fn log(&self, event: &CueEvent) -> Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read back every entry. Unparseable lines are skipped.
    pub async fn read_all(&self) -> Result<Vec<CueEvent>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(content
            .lines()
            .filter(|l| !l.is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect())
    }

    /// Log cues from `cues` until the channel closes or `cancel` fires.
    /// Returns the number of entries written.
    pub async fn follow(
        &self,
        mut cues: broadcast::Receiver<CueEvent>,
        cancel: CancellationToken,
    ) -> Result<usize> {
        let mut written = 0;
        loop {
            let event = tokio::select! {
                received = cues.recv() => match received {
                    Ok(event) => event,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "cue log fell behind");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = cancel.cancelled() => break,
            };
            self.log(&event).await?;
            written += 1;
        }

        // Flush whatever was already queued when we were told to stop.
        while let Ok(event) = cues.try_recv() {
            self.log(&event).await?;
            written += 1;
        }
        Ok(written)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surtitle_types::{CueCause, Trigger};

    fn cue(to: usize) -> CueEvent {
        CueEvent::new(
            Some(to - 1),
            Some(to),
            Some(format!("line-{to:03}")),
            CueCause::Auto {
                trigger: Trigger::Exit,
            },
        )
    }

    #[tokio::test]
    async fn log_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("show.jsonl");
        let logger = CueLogger::new(path).unwrap();

        logger.log(&cue(1)).await.unwrap();
        logger.log(&cue(2)).await.unwrap();

        let entries = logger.read_all().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].to, Some(2));
        assert_eq!(entries[1].line_id.as_deref(), Some("line-002"));
    }

    #[tokio::test]
    async fn read_all_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let logger = CueLogger::new(dir.path().join("show.jsonl")).unwrap();
        logger.log(&cue(1)).await.unwrap();
        tokio::fs::OpenOptions::new()
            .append(true)
            .open(logger.path())
            .await
            .unwrap()
            .write_all(b"{not json\n")
            .await
            .unwrap();

        assert_eq!(logger.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn follow_writes_until_closed() {
        let dir = tempfile::tempdir().unwrap();
        let logger = CueLogger::new(dir.path().join("show.jsonl")).unwrap();
        let (tx, rx) = broadcast::channel(8);

        tx.send(cue(1)).unwrap();
        tx.send(cue(2)).unwrap();
        drop(tx);

        let written = logger.follow(rx, CancellationToken::new()).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(logger.read_all().await.unwrap().len(), 2);
    }
}
