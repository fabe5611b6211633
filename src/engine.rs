use std::sync::mpsc::Sender;
use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::corpus::{self, Tier};
use crate::rating::{self, RatingTier};
use crate::score::{self, ScoreSnapshot};
use crate::timer::{Countdown, TickOutcome};

/// Session lengths the trainer offers.
pub const SUPPORTED_DURATIONS: [u32; 2] = [120, 180];

/// Immutable per-attempt settings, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub tier: Tier,
    pub duration_secs: u32,
}

impl SessionConfig {
    pub fn new(tier: Tier, duration_secs: u32) -> Result<Self, EngineError> {
        if !SUPPORTED_DURATIONS.contains(&duration_secs) {
            return Err(EngineError::UnsupportedDuration {
                secs: duration_secs,
            });
        }
        Ok(Self {
            tier,
            duration_secs,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tier: Tier::Easy,
            duration_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Status {
    Idle,
    Active,
    Finished,
}

/// The mutable state of a single attempt. Created fresh on every `start`;
/// the previous attempt is discarded entirely.
#[derive(Debug)]
pub struct Session {
    pub target: String,
    pub typed: String,
    pub correct_chars: usize,
    pub total_chars: usize,
    pub started_at: Instant,
    pub status: Status,
}

/// Result payload carried by the single `Finished` event of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub wpm: u32,
    pub accuracy: u32,
    pub elapsed_secs: f64,
    pub rating: RatingTier,
    pub tier: Tier,
}

/// Observable state changes, published to the presentation layer. The engine
/// never touches screen state itself.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Started { target: String },
    Progress(ScoreSnapshot),
    Tick { remaining_secs: u32 },
    Finished(SessionResult),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("`{command}` is not allowed while the session is {status}")]
    InvalidTransition {
        command: &'static str,
        status: Status,
    },
    #[error("unsupported session duration: {secs}s (choose 120 or 180)")]
    UnsupportedDuration { secs: u32 },
}

/// Orchestrates one attempt at a time: generates the target text, tracks the
/// typed prefix, coordinates the countdown, and emits events.
///
/// All commands take `&mut self`, so input and tick signals aimed at the same
/// session are serialized by construction; the finish transition is guarded
/// to run at most once per session no matter which trigger lands first.
pub struct Engine {
    config: SessionConfig,
    session: Option<Session>,
    countdown: Countdown,
    rng: StdRng,
    events: Sender<EngineEvent>,
}

impl Engine {
    pub fn new(events: Sender<EngineEvent>) -> Self {
        Self::with_rng(events, StdRng::from_entropy())
    }

    /// Build an engine over a caller-supplied RNG; seeded in tests for
    /// reproducible target text.
    pub fn with_rng(events: Sender<EngineEvent>, rng: StdRng) -> Self {
        Self {
            config: SessionConfig::default(),
            session: None,
            countdown: Countdown::default(),
            rng,
            events,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn status(&self) -> Status {
        self.session
            .as_ref()
            .map(|session| session.status)
            .unwrap_or(Status::Idle)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    /// Store new settings for the next attempt. Rejected while a session is
    /// running; a finished attempt may be reconfigured directly.
    pub fn configure(&mut self, config: SessionConfig) -> Result<(), EngineError> {
        self.guard_not_active("configure")?;
        debug!(
            "configured: tier={}, duration={}s",
            config.tier, config.duration_secs
        );
        self.config = config;
        Ok(())
    }

    /// Begin a fresh attempt: generate the target text, arm the countdown,
    /// and publish `Started`. Valid whenever no session is currently active.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.guard_not_active("start")?;

        let target = corpus::generate(self.config.tier, &mut self.rng);
        info!(
            "session started: tier={}, duration={}s, target={} chars",
            self.config.tier,
            self.config.duration_secs,
            target.chars().count()
        );

        self.countdown.start(self.config.duration_secs);
        self.session = Some(Session {
            target: target.clone(),
            typed: String::new(),
            correct_chars: 0,
            total_chars: 0,
            started_at: Instant::now(),
            status: Status::Active,
        });
        self.emit(EngineEvent::Started { target });
        Ok(())
    }

    /// Replace the typed prefix with the input widget's current contents and
    /// rescore from scratch (correct under backspacing). Exhausting the
    /// target finishes the session immediately, ahead of any pending tick.
    pub fn submit_input(&mut self, typed: &str) -> Result<(), EngineError> {
        let status = self.status();
        let done = match self.session.as_mut() {
            Some(session) if status == Status::Active => {
                session.typed = typed.to_string();
                session.total_chars = typed.chars().count();
                session.correct_chars = score::correct_chars(&session.target, typed);
                session.total_chars >= session.target.chars().count()
            }
            _ => {
                return Err(EngineError::InvalidTransition {
                    command: "submit_input",
                    status,
                })
            }
        };

        if done {
            self.finish();
            return Ok(());
        }

        if let Some(session) = self.session.as_ref() {
            let elapsed = session.started_at.elapsed().as_secs_f64();
            let snapshot = score::score(&session.target, &session.typed, elapsed);
            self.emit(EngineEvent::Progress(snapshot));
        }
        Ok(())
    }

    /// Advance the countdown by one second. A tick that lands outside an
    /// active session (after finish, stop, or before start) is inert: the
    /// countdown was stopped synchronously with the transition.
    pub fn on_tick(&mut self) {
        if self.status() != Status::Active {
            return;
        }

        match self.countdown.tick() {
            Some(TickOutcome::Running(remaining_secs)) => {
                self.emit(EngineEvent::Tick { remaining_secs });
            }
            Some(TickOutcome::Expired) => {
                debug!("countdown expired");
                self.emit(EngineEvent::Tick { remaining_secs: 0 });
                self.finish();
            }
            None => {}
        }
    }

    /// Abandon the running attempt without results. The countdown stops
    /// synchronously, so no expiry can fire into the discarded session.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        match self.status() {
            Status::Active => {
                self.countdown.stop();
                self.session = None;
                info!("session stopped");
                Ok(())
            }
            status => Err(EngineError::InvalidTransition {
                command: "stop",
                status,
            }),
        }
    }

    /// The single finish path, shared by text exhaustion and timer expiry.
    /// Guarded so that simultaneous triggers produce exactly one `Finished`.
    fn finish(&mut self) {
        let result = match self.session.as_mut() {
            Some(session) if session.status == Status::Active => {
                session.status = Status::Finished;
                let elapsed = session.started_at.elapsed().as_secs_f64();
                let snapshot = score::score(&session.target, &session.typed, elapsed);
                SessionResult {
                    wpm: snapshot.wpm,
                    accuracy: snapshot.accuracy,
                    elapsed_secs: elapsed,
                    rating: rating::classify(snapshot.wpm, snapshot.accuracy),
                    tier: self.config.tier,
                }
            }
            _ => return,
        };

        self.countdown.stop();
        info!(
            "session finished: {} wpm, {}% accuracy in {:.1}s, rated {}",
            result.wpm, result.accuracy, result.elapsed_secs, result.rating
        );
        self.emit(EngineEvent::Finished(result));
    }

    fn guard_not_active(&self, command: &'static str) -> Result<(), EngineError> {
        match self.status() {
            Status::Active => Err(EngineError::InvalidTransition {
                command,
                status: Status::Active,
            }),
            _ => Ok(()),
        }
    }

    fn emit(&self, event: EngineEvent) {
        // A detached presentation layer is not an engine failure.
        let _ = self.events.send(event);
    }
}
