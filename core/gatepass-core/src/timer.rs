//! Inactivity reset timer for the scan buffer.
//!
//! Modelled as a deadline rather than a background thread: the owner asks
//! whether it has expired on every key press and on periodic ticks. Clearing
//! an unarmed timer is a no-op.

use std::time::{Duration, Instant};

pub const DEFAULT_INACTIVITY_WINDOW: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct InactivityTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl InactivityTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Restarts the window from `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.map(|deadline| now >= deadline).unwrap_or(false)
    }
}

impl Default for InactivityTimer {
    fn default() -> Self {
        Self::new(DEFAULT_INACTIVITY_WINDOW)
    }
}
