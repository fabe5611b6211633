use std::time::{Duration, Instant};

/// Result of advancing the countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting down; carries the seconds left.
    Running(u32),
    /// The 1 -> 0 transition. Reported exactly once per countdown.
    Expired,
}

/// Logical one-per-second countdown for a session.
///
/// The wall-clock cadence comes from the runtime's ticker thread; this type
/// only owns the remaining-seconds state and the expiry edge. Elapsed time
/// for scoring is read from the wall clock via `elapsed`, never derived from
/// tick counts, since ticks can drift under scheduling delay.
#[derive(Debug, Default)]
pub struct Countdown {
    remaining: u32,
    running: bool,
    started_at: Option<Instant>,
}

impl Countdown {
    pub fn start(&mut self, duration_secs: u32) {
        self.remaining = duration_secs;
        self.running = true;
        self.started_at = Some(Instant::now());
    }

    /// Advance by one second. Returns `None` once stopped or expired, so a
    /// stray tick after cancellation is inert.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.running {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Some(TickOutcome::Expired)
        } else {
            Some(TickOutcome::Running(self.remaining))
        }
    }

    /// Cancel the countdown; no further tick outcomes or expiry will fire.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    /// Wall-clock time since the countdown was last started.
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|at| at.elapsed())
            .unwrap_or(Duration::ZERO)
    }
}
