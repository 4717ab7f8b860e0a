//! Session controller: owns one training attempt end-to-end.
//!
//! Three asynchronous signals can end a call - a termination tag in a persona
//! turn, a platform disconnect, and the duration cap - and a trainee-initiated
//! hangup races all of them. They are reconciled through a single atomic
//! "ending" latch: the first trigger to flip it wins, every later trigger is a
//! silent no-op. No signal path may leave a session stuck in `in_call`; the
//! duration timer is the backstop when everything else is lost.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{AppResult, SessionError, SessionResult};
use crate::provider::{CallSetup, VoiceConnector, VoiceEvent, VoiceSession};
use crate::scenario::{has_end_tag, parse_end_tag, ScenarioType, TerminationSignal, UserContext};
use crate::storage::{HistoryStore, SessionRecord};

use super::{EndReason, Speaker, TrainingSession, TrainingStatus, TranscriptMessage};

/// Orchestrates the lifecycle of one training attempt.
///
/// Cheap to clone; clones share the same underlying session state, which is
/// what lets the timer task, the event pump, and the caller's own handle race
/// safely for the end latch.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

struct Inner {
    config: SessionConfig,
    history: Arc<dyn HistoryStore>,
    status: Mutex<TrainingStatus>,
    session: Mutex<Option<TrainingSession>>,
    transcript: Mutex<Vec<TranscriptMessage>>,
    /// Whole seconds of call time, ticked by the timer task.
    elapsed_seconds: AtomicU32,
    /// End latch. First setter wins; see module docs.
    ending: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
    voice: Mutex<Option<Arc<dyn VoiceSession>>>,
    last_error: Mutex<Option<String>>,
}

impl SessionController {
    /// Create a controller with a session policy and a history store.
    pub fn new(config: SessionConfig, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                history,
                status: Mutex::new(TrainingStatus::Idle),
                session: Mutex::new(None),
                transcript: Mutex::new(Vec::new()),
                elapsed_seconds: AtomicU32::new(0),
                ending: AtomicBool::new(false),
                timer: Mutex::new(None),
                voice: Mutex::new(None),
                last_error: Mutex::new(None),
            }),
        }
    }

    /// Current lifecycle state.
    pub fn status(&self) -> TrainingStatus {
        *self.inner.status.lock().expect("status lock")
    }

    /// Snapshot of the active session, if any.
    pub fn session(&self) -> Option<TrainingSession> {
        self.inner.session.lock().expect("session lock").clone()
    }

    /// Snapshot of the transcript so far.
    pub fn transcript(&self) -> Vec<TranscriptMessage> {
        self.inner.transcript.lock().expect("transcript lock").clone()
    }

    /// Whole seconds elapsed since the call connected.
    pub fn elapsed_seconds(&self) -> u32 {
        self.inner.elapsed_seconds.load(Ordering::SeqCst)
    }

    /// Last platform error surfaced to the trainee, if any.
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.lock().expect("error lock").clone()
    }

    /// Allocate a fresh session for a scenario: `idle -> preparing`.
    ///
    /// Returns the new session id. Also valid from `completed`, which is how
    /// the next attempt starts.
    pub fn prepare(
        &self,
        scenario_type: ScenarioType,
        user_context: UserContext,
    ) -> SessionResult<String> {
        let mut status = self.inner.status.lock().expect("status lock");
        match *status {
            TrainingStatus::Idle | TrainingStatus::Completed => {}
            other => {
                return Err(SessionError::InvalidTransition {
                    from: other.to_string(),
                    to: TrainingStatus::Preparing.to_string(),
                });
            }
        }

        let session = TrainingSession::new(scenario_type, user_context);
        let id = session.id.clone();

        *self.inner.session.lock().expect("session lock") = Some(session);
        self.inner.transcript.lock().expect("transcript lock").clear();
        self.inner.elapsed_seconds.store(0, Ordering::SeqCst);
        self.inner.ending.store(false, Ordering::SeqCst);
        *self.inner.last_error.lock().expect("error lock") = None;
        *status = TrainingStatus::Preparing;

        info!(session = %id, scenario = %scenario_type, "session prepared");
        Ok(id)
    }

    /// Start the call on a voice platform and begin consuming its events.
    ///
    /// On connection failure the controller returns to `idle` and the
    /// allocated session is discarded; the caller may retry with a fresh
    /// [`Self::prepare`]. On success the event pump runs until the platform
    /// disconnects.
    pub async fn start_call<C>(&self, connector: &C, setup: CallSetup) -> AppResult<()>
    where
        C: VoiceConnector + ?Sized,
    {
        if self.status() != TrainingStatus::Preparing {
            return Err(SessionError::InvalidTransition {
                from: self.status().to_string(),
                to: TrainingStatus::InCall.to_string(),
            }
            .into());
        }

        let (tx, rx) = mpsc::channel(64);
        match connector.connect(setup, tx).await {
            Ok(voice) => {
                *self.inner.voice.lock().expect("voice lock") = Some(voice);
                let pump = self.clone();
                tokio::spawn(async move { pump.pump_events(rx).await });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "voice platform connection failed");
                *self.inner.status.lock().expect("status lock") = TrainingStatus::Idle;
                *self.inner.session.lock().expect("session lock") = None;
                Err(e.into())
            }
        }
    }

    /// Consume platform events until the channel closes.
    ///
    /// A closed channel is treated as a disconnect; the end latch absorbs the
    /// duplicate when a `Disconnected` event already arrived.
    pub async fn pump_events(&self, mut events: mpsc::Receiver<VoiceEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        self.end_session(EndReason::CallEnded).await;
    }

    /// React to one platform event.
    pub async fn handle_event(&self, event: VoiceEvent) {
        match event {
            VoiceEvent::Connected => self.on_connected(),
            VoiceEvent::Disconnected => self.end_session(EndReason::CallEnded).await,
            VoiceEvent::Message { speaker, text } => self.on_message(speaker, text),
            VoiceEvent::ModeChange { speaking } => {
                // Presentation-only; not recorded.
                debug!(speaking, "mode change");
            }
            VoiceEvent::Error { message } => {
                warn!(error = %message, "voice platform error");
                *self.inner.last_error.lock().expect("error lock") = Some(message);
            }
        }
    }

    /// `preparing -> in_call`: stamp the start time and launch the duration
    /// timer.
    fn on_connected(&self) {
        {
            let mut status = self.inner.status.lock().expect("status lock");
            if *status != TrainingStatus::Preparing {
                debug!(status = %status, "ignoring connect event");
                return;
            }
            *status = TrainingStatus::InCall;
        }
        if let Some(session) = self.inner.session.lock().expect("session lock").as_mut() {
            session.started_at = Some(Utc::now());
            info!(session = %session.id, "call connected");
        }
        self.spawn_timer();
    }

    /// Append a transcript turn; persona turns are checked for a termination
    /// tag first.
    fn on_message(&self, speaker: Speaker, text: String) {
        if self.status() != TrainingStatus::InCall {
            debug!("dropping transcript turn outside in_call");
            return;
        }

        if speaker == Speaker::Persona && has_end_tag(&text) {
            // Lenient detect, strict parse: a malformed payload degrades to
            // the default signal rather than erroring.
            let signal = parse_end_tag(&text).unwrap_or_else(TerminationSignal::fallback);
            self.on_termination_signal(signal);
        }

        self.inner
            .transcript
            .lock()
            .expect("transcript lock")
            .push(TranscriptMessage {
                speaker,
                text,
                timestamp: Utc::now(),
            });
    }

    /// Record the classified outcome and schedule the classified end after
    /// the grace delay, so the persona's closing line can finish playing.
    fn on_termination_signal(&self, signal: TerminationSignal) {
        info!(
            reached_stage = signal.reached_stage,
            reason = %signal.termination_reason,
            "termination tag detected"
        );
        if let Some(session) = self.inner.session.lock().expect("session lock").as_mut() {
            session.reached_stage = session.reached_stage.max(signal.reached_stage);
        }

        let controller = self.clone();
        let delay = self.inner.config.end_scenario_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller
                .end_session(signal.termination_reason.into())
                .await;
        });
    }

    /// Trainee-initiated hangup. Races the other end triggers through the
    /// same latch; no special priority.
    pub async fn end_call(&self) {
        self.end_session(EndReason::UserEnded).await;
    }

    /// `in_call -> debriefing`, exactly once.
    ///
    /// Whichever trigger reaches the latch first decides the reason; every
    /// later trigger returns without touching the session.
    async fn end_session(&self, reason: EndReason) {
        if self.inner.ending.swap(true, Ordering::SeqCst) {
            debug!(reason = %reason, "session already ending, trigger ignored");
            return;
        }

        if let Some(timer) = self.inner.timer.lock().expect("timer lock").take() {
            timer.abort();
        }

        let elapsed = self.inner.elapsed_seconds.load(Ordering::SeqCst);
        {
            let mut session = self.inner.session.lock().expect("session lock");
            let Some(session) = session.as_mut() else {
                // Latch flipped with nothing allocated (e.g. disconnect after
                // a failed start); nothing to finalize.
                return;
            };
            session.ended_at = Some(Utc::now());
            session.duration_seconds = Some(elapsed);
            session.termination_reason = Some(reason);
            info!(
                session = %session.id,
                reason = %reason,
                duration_seconds = elapsed,
                reached_stage = session.reached_stage,
                "session ended"
            );
        }
        *self.inner.status.lock().expect("status lock") = TrainingStatus::Debriefing;

        let voice = self.inner.voice.lock().expect("voice lock").take();
        if let Some(voice) = voice {
            if let Err(e) = voice.end().await {
                warn!(error = %e, "platform teardown failed");
            }
        }
    }

    /// `debriefing -> completed`: persist a compact history record and clear
    /// the active session.
    ///
    /// The history log is bounded; the oldest records are evicted past the
    /// configured cap.
    pub async fn complete(&self) -> AppResult<SessionRecord> {
        {
            let status = self.inner.status.lock().expect("status lock");
            if *status != TrainingStatus::Debriefing {
                return Err(SessionError::InvalidTransition {
                    from: status.to_string(),
                    to: TrainingStatus::Completed.to_string(),
                }
                .into());
            }
        }

        let session = self
            .inner
            .session
            .lock()
            .expect("session lock")
            .take()
            .ok_or(SessionError::NoActiveSession)?;

        let record = SessionRecord {
            id: session.id.clone(),
            date: session.ended_at.unwrap_or_else(Utc::now),
            scenario_type: session.scenario_type,
            reached_stage: session.reached_stage,
            duration_seconds: session.duration_seconds.unwrap_or(0),
        };

        let mut history = self.inner.history.load().await?;
        history.insert(0, record.clone());
        history.truncate(self.inner.config.max_history);
        self.inner.history.save(&history).await?;

        *self.inner.status.lock().expect("status lock") = TrainingStatus::Completed;
        info!(session = %record.id, "session completed and recorded");
        Ok(record)
    }

    /// Loaded history, newest first.
    pub async fn history(&self) -> AppResult<Vec<SessionRecord>> {
        Ok(self.inner.history.load().await?)
    }

    fn spawn_timer(&self) {
        let controller = self.clone();
        let tick = self.inner.config.timer_interval();
        let cap = self.inner.config.max_call_duration_seconds;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first tick fires immediately; skip it so one tick == one
            // interval of call time.
            interval.tick().await;
            loop {
                interval.tick().await;
                let elapsed = controller
                    .inner
                    .elapsed_seconds
                    .fetch_add(1, Ordering::SeqCst)
                    + 1;
                if elapsed >= cap {
                    info!(elapsed, cap, "duration cap reached");
                    controller.end_session(EndReason::MaxDurationReached).await;
                    return;
                }
            }
        });

        *self.inner.timer.lock().expect("timer lock") = Some(handle);
    }
}
