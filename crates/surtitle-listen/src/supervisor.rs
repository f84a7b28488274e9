//! Listening supervisor.
//!
//! Owns the recognizer lifecycle as an explicit state machine
//! (`Idle` → `Listening` ⇄ `Restarting` → `Idle`) and is the single
//! consumer of recognizer events, forwarding fragments to the
//! [`Tracker`] in arrival order.
//!
//! Once spawned, operator commands take priority over recognizer
//! events: a fragment emitted after a stop was queued is never
//! evaluated.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use surtitle_core::{Evaluation, Tracker};
use surtitle_types::{ListenConfig, Result, SurtitleError};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::recognizer::{Recognizer, RecognizerEvent, RecognizerEventKind, TranscriptSink};

/// Queued operator commands before senders wait.
const COMMAND_CAPACITY: usize = 16;

/// Supervisor lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorState {
    /// No recognizer session; fragments are ignored.
    #[default]
    Idle,
    /// A recognizer session is running.
    Listening,
    /// The session ended and a new one is being started.
    Restarting,
}

impl std::fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Listening => write!(f, "listening"),
            Self::Restarting => write!(f, "restarting"),
        }
    }
}

/// Published supervisor status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorStatus {
    pub state: SupervisorState,
    /// Successful automatic restarts since creation.
    pub restarts: u32,
    /// Most recent recognizer error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Operator command for a running supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenCommand {
    Start,
    Stop,
    Toggle,
}

/// What handling one recognizer event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A fragment was evaluated by the tracker.
    Evaluated(Evaluation),
    /// The event belonged to an old session or arrived while idle.
    Discarded,
    /// The session ended and a new one is running.
    Restarted,
    /// The session ended and auto-restart is off.
    Stopped,
    /// Restarting failed too many times in a row.
    GaveUp,
}

/// Drives one [`Recognizer`] and feeds its fragments to a [`Tracker`].
pub struct ListeningSupervisor<R: Recognizer> {
    recognizer: R,
    tracker: Arc<Tracker>,
    config: ListenConfig,
    state: SupervisorState,
    epoch: u64,
    restarts: u32,
    last_error: Option<String>,
    events_tx: mpsc::Sender<RecognizerEvent>,
    events_rx: mpsc::Receiver<RecognizerEvent>,
    status_tx: watch::Sender<SupervisorStatus>,
    /// Operator commands, present once [`run`](Self::run) is driving.
    commands: Option<mpsc::Receiver<ListenCommand>>,
    cancel: CancellationToken,
}

impl<R: Recognizer> ListeningSupervisor<R> {
    pub fn new(recognizer: R, tracker: Arc<Tracker>, config: ListenConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(config.event_capacity.max(1));
        let (status_tx, _) = watch::channel(SupervisorStatus::default());
        Self {
            recognizer,
            tracker,
            config,
            state: SupervisorState::Idle,
            epoch: 0,
            restarts: 0,
            last_error: None,
            events_tx,
            events_rx,
            status_tx,
            commands: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Current session epoch. Bumped on every start, stop and restart.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn status(&self) -> SupervisorStatus {
        SupervisorStatus {
            state: self.state,
            restarts: self.restarts,
            last_error: self.last_error.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SupervisorStatus> {
        self.status_tx.subscribe()
    }

    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    /// Start listening. No-op unless idle.
    pub async fn start(&mut self) -> Result<()> {
        if self.state != SupervisorState::Idle {
            return Ok(());
        }
        self.epoch += 1;
        self.tracker.set_listening(true);

        let sink = self.sink();
        match self.recognizer.start(sink).await {
            Ok(()) => {
                self.state = SupervisorState::Listening;
                info!(
                    recognizer = self.recognizer.name(),
                    epoch = self.epoch,
                    "listening started"
                );
                self.publish();
                Ok(())
            }
            Err(e) => {
                warn!(
                    recognizer = self.recognizer.name(),
                    error = %e,
                    "recognizer failed to start"
                );
                self.epoch += 1;
                self.tracker.set_listening(false);
                self.last_error = Some(e.to_string());
                self.publish();
                Err(e)
            }
        }
    }

    /// Stop listening. No-op when idle. Fragments still in flight from
    /// the stopped session are discarded when they arrive.
    pub async fn stop(&mut self) {
        if self.state == SupervisorState::Idle {
            return;
        }
        self.go_idle().await;
        info!(recognizer = self.recognizer.name(), "listening stopped");
    }

    pub async fn toggle(&mut self) -> Result<()> {
        if self.state == SupervisorState::Idle {
            self.start().await
        } else {
            self.stop().await;
            Ok(())
        }
    }

    /// Apply one recognizer event.
    pub async fn handle_event(&mut self, event: RecognizerEvent) -> EventOutcome {
        if event.epoch != self.epoch || self.state != SupervisorState::Listening {
            trace!(
                epoch = event.epoch,
                current = self.epoch,
                "discarding stale recognizer event"
            );
            return EventOutcome::Discarded;
        }

        match event.kind {
            RecognizerEventKind::Transcript(text) => {
                EventOutcome::Evaluated(self.tracker.ingest(&text))
            }
            RecognizerEventKind::Ended => {
                debug!(epoch = self.epoch, "recognizer session ended");
                self.session_over().await
            }
            RecognizerEventKind::Failed(reason) => {
                warn!(epoch = self.epoch, %reason, "recognizer session failed");
                self.last_error = Some(reason);
                self.session_over().await
            }
        }
    }

    /// Wait for the next recognizer event and handle it.
    pub async fn pump(&mut self) -> Option<EventOutcome> {
        let event = self.events_rx.recv().await?;
        Some(self.handle_event(event).await)
    }

    /// Handle every event already queued, without waiting.
    pub async fn drain(&mut self) -> Vec<EventOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            outcomes.push(self.handle_event(event).await);
        }
        outcomes
    }

    /// Run as the sole consumer of recognizer events and operator
    /// commands until `cancel` fires or every command sender is dropped.
    ///
    /// Commands are polled before events, so a stop takes effect ahead
    /// of any fragment sent after it. Cancellation is polled last: events
    /// already queued are handled before shutting down. Stops listening
    /// on the way out.
    pub async fn run(
        mut self,
        commands: mpsc::Receiver<ListenCommand>,
        cancel: CancellationToken,
    ) {
        enum Step {
            Event(RecognizerEvent),
            Command(ListenCommand),
            Shutdown,
        }

        self.commands = Some(commands);
        self.cancel = cancel;

        loop {
            let Some(commands) = self.commands.as_mut() else {
                break;
            };
            let step = tokio::select! {
                biased;
                command = commands.recv() => command.map_or(Step::Shutdown, Step::Command),
                Some(event) = self.events_rx.recv() => Step::Event(event),
                _ = self.cancel.cancelled() => Step::Shutdown,
            };

            match step {
                Step::Event(event) => {
                    self.handle_event(event).await;
                }
                Step::Command(command) => self.apply(command).await,
                Step::Shutdown => break,
            }
        }

        self.stop().await;
        debug!("listening supervisor exited");
    }

    async fn apply(&mut self, command: ListenCommand) {
        let result = match command {
            ListenCommand::Start => self.start().await,
            ListenCommand::Stop => {
                self.stop().await;
                Ok(())
            }
            ListenCommand::Toggle => self.toggle().await,
        };
        if let Err(e) = result {
            debug!(?command, error = %e, "listen command failed");
        }
    }

    fn sink(&self) -> TranscriptSink {
        TranscriptSink::new(self.epoch, self.events_tx.clone())
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.status());
    }

    async fn go_idle(&mut self) {
        self.epoch += 1;
        self.state = SupervisorState::Idle;
        self.tracker.set_listening(false);
        self.recognizer.stop().await;
        self.publish();
    }

    async fn session_over(&mut self) -> EventOutcome {
        if !self.config.auto_restart || self.config.max_restart_attempts == 0 {
            self.go_idle().await;
            info!(
                recognizer = self.recognizer.name(),
                "recognizer ended, auto-restart off"
            );
            return EventOutcome::Stopped;
        }
        self.restart().await
    }

    async fn restart(&mut self) -> EventOutcome {
        self.state = SupervisorState::Restarting;
        self.publish();
        self.recognizer.stop().await;

        let backoff = Duration::from_millis(self.config.restart_backoff_ms);
        let mut failures = 0u32;
        loop {
            self.epoch += 1;
            self.tracker.reset_window();

            let sink = self.sink();
            match self.recognizer.start(sink).await {
                Ok(()) => {
                    self.restarts += 1;
                    self.state = SupervisorState::Listening;
                    info!(
                        epoch = self.epoch,
                        restarts = self.restarts,
                        "recognizer restarted"
                    );
                    self.publish();
                    return EventOutcome::Restarted;
                }
                Err(e) => {
                    failures += 1;
                    warn!(attempt = failures, error = %e, "recognizer restart failed");
                    self.last_error = Some(e.to_string());
                    if failures >= self.config.max_restart_attempts {
                        warn!(attempts = failures, "giving up on recognizer");
                        self.go_idle().await;
                        return EventOutcome::GaveUp;
                    }
                    if self.interrupted_within(backoff).await {
                        self.go_idle().await;
                        info!(
                            recognizer = self.recognizer.name(),
                            "restart abandoned, listening stopped"
                        );
                        return EventOutcome::Stopped;
                    }
                }
            }
        }
    }

    /// Wait out a restart backoff. Returns `true` if a stop, a toggle,
    /// cancellation or the loss of every command sender cuts it short.
    /// A start received meanwhile is a no-op.
    async fn interrupted_within(&mut self, delay: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + delay;
        let Some(commands) = self.commands.as_mut() else {
            tokio::time::sleep_until(deadline).await;
            return false;
        };
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return true,
                command = commands.recv() => match command {
                    Some(ListenCommand::Start) => continue,
                    Some(command) => {
                        debug!(?command, "command received during restart backoff");
                        return true;
                    }
                    None => return true,
                },
                _ = tokio::time::sleep_until(deadline) => return false,
            }
        }
    }
}

impl<R: Recognizer + 'static> ListeningSupervisor<R> {
    /// Move the supervisor onto its own task.
    pub fn spawn(self, cancel: CancellationToken) -> (SupervisorHandle, JoinHandle<()>) {
        let (commands, rx) = mpsc::channel(COMMAND_CAPACITY);
        let handle = SupervisorHandle {
            commands,
            status: self.subscribe(),
        };
        let task = tokio::spawn(self.run(rx, cancel));
        (handle, task)
    }
}

/// Operator-side handle to a spawned supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    commands: mpsc::Sender<ListenCommand>,
    status: watch::Receiver<SupervisorStatus>,
}

impl SupervisorHandle {
    pub async fn start(&self) -> Result<()> {
        self.send(ListenCommand::Start).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(ListenCommand::Stop).await
    }

    /// Flip listening on or off.
    pub async fn toggle(&self) -> Result<()> {
        self.send(ListenCommand::Toggle).await
    }

    pub fn status(&self) -> SupervisorStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SupervisorStatus> {
        self.status.clone()
    }

    async fn send(&self, command: ListenCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SurtitleError::Channel("listening supervisor has shut down".into()))
    }
}
