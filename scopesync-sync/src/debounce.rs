//! Trailing debounce.

use std::time::Duration;
use tokio::time::Instant;

/// Single-shot timer that is pushed back on every [`schedule`].
///
/// The timer only tracks a deadline; the owner waits on it (see
/// [`SyncSession::run`](crate::SyncSession::run)) or polls
/// [`is_due`](FlushTimer::is_due).
///
/// [`schedule`]: FlushTimer::schedule
#[derive(Debug, Clone)]
pub struct FlushTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl FlushTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms the timer `delay` from now, replacing any pending deadline.
    pub fn schedule(&mut self) -> Instant {
        let deadline = Instant::now() + self.delay;
        self.deadline = Some(deadline);
        deadline
    }

    /// Disarms the timer. Returns whether it was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }
}
