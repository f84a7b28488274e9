//! `surtitle replay` -- follow a script with a recorded transcript.
//!
//! Runs the same pipeline as a live show (recognizer → supervisor →
//! tracker) with a [`ReplayRecognizer`] standing in for the microphone,
//! and prints every cue as it happens.
//!
//! # Examples
//!
//! ```text
//! surtitle replay --script hamlet.json --transcript act1.txt
//! surtitle replay -s hamlet.json -t act1.txt --interval-ms 300 --log cues.jsonl
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use surtitle_core::Tracker;
use surtitle_listen::{CueLogger, ListeningSupervisor, ReplayRecognizer, SupervisorState};
use surtitle_types::{CueEvent, Script};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{load_config, read_script};

/// Arguments for the `replay` subcommand.
#[derive(Args)]
pub struct ReplayArgs {
    /// Script file: JSON array of {id, text, speaker?, note?}.
    #[arg(short, long)]
    pub script: PathBuf,

    /// Transcript file: one fragment per line, `---` ends a recognizer session.
    #[arg(short, long)]
    pub transcript: PathBuf,

    /// Delay before each fragment, in milliseconds.
    #[arg(long, default_value = "0")]
    pub interval_ms: u64,

    /// Append cue events to this JSONL file.
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Run the `replay` subcommand.
pub async fn run(args: ReplayArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref()).await?;
    let script = read_script(&args.script).await?;
    let replay = ReplayRecognizer::from_file(&args.transcript)
        .await?
        .with_interval(Duration::from_millis(args.interval_ms));
    if replay.is_empty() {
        anyhow::bail!("transcript {} has no fragments", args.transcript.display());
    }
    let done = replay.completion();

    let tracker = Arc::new(Tracker::new(config.alignment.clone()));
    let drained = CancellationToken::new();

    let printer = tokio::spawn(print_cues(
        tracker.subscribe_cues(),
        script.clone(),
        drained.clone(),
    ));
    let log_task = match &args.log {
        Some(path) => {
            let logger = CueLogger::new(path)?;
            let cues = tracker.subscribe_cues();
            let drained = drained.clone();
            Some(tokio::spawn(async move { logger.follow(cues, drained).await }))
        }
        None => None,
    };

    tracker.load(script);

    let cancel = CancellationToken::new();
    let supervisor = ListeningSupervisor::new(replay, Arc::clone(&tracker), config.listen.clone());
    let (handle, task) = supervisor.spawn(cancel.clone());
    let mut status = handle.subscribe();

    handle.start().await?;
    let started = status
        .wait_for(|s| s.state != SupervisorState::Idle || s.last_error.is_some())
        .await?
        .clone();

    if started.state != SupervisorState::Idle {
        tokio::select! {
            _ = done.notified() => {}
            _ = status.wait_for(|s| s.state == SupervisorState::Idle) => {}
            _ = tokio::signal::ctrl_c() => info!("interrupted"),
        }
    }

    // Queued fragments are handled before the cancellation is seen.
    cancel.cancel();
    task.await?;
    drained.cancel();
    printer.await?;
    if let Some(log_task) = log_task {
        let written = log_task.await??;
        info!(written, "cue log written");
    }

    let status = handle.status();
    if let Some(err) = &status.last_error {
        eprintln!("recognizer: {err}");
    }
    let snap = tracker.snapshot();
    match &snap.current_line {
        Some(line) => println!(
            "final: line {} of {} ({}), {} restart(s)",
            snap.position() + 1,
            snap.total_lines,
            line.id,
            status.restarts
        ),
        None => println!("final: no line active, {} restart(s)", status.restarts),
    }
    Ok(())
}

async fn print_cues(
    mut cues: broadcast::Receiver<CueEvent>,
    script: Script,
    drained: CancellationToken,
) {
    loop {
        let cue = tokio::select! {
            received = cues.recv() => match received {
                Ok(cue) => cue,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return,
            },
            _ = drained.cancelled() => break,
        };
        print_cue(&cue, &script);
    }
    while let Ok(cue) = cues.try_recv() {
        print_cue(&cue, &script);
    }
}

fn print_cue(cue: &CueEvent, script: &Script) {
    let Some(index) = cue.to else {
        println!("[--] ({}) titles cleared", cue.cause);
        return;
    };
    let Some(line) = script.get(index) else {
        return;
    };
    let speaker = line
        .speaker
        .as_deref()
        .map(|s| format!("{s}: "))
        .unwrap_or_default();
    println!(
        "[{:>3}] {} ({}) {speaker}{}",
        index + 1,
        line.id,
        cue.cause,
        line.text
    );
}
