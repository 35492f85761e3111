//! Short-lived duplicate suppression for scans.
//!
//! Verification carries no idempotency token, so the same QR flushed twice in
//! quick succession would record two entries. Scans are keyed on
//! `(subject, raw payload, channel)`, so switching terminators on the same
//! code is never suppressed. A zero window disables suppression.

use gatepass_protocol::Channel;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct DedupeWindow {
    window: Duration,
    seen: HashMap<(String, String, Channel), Instant>,
}

impl DedupeWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.window.is_zero()
    }

    /// Returns true if an identical scan was accepted within the window.
    pub fn is_duplicate(
        &mut self,
        subject: &str,
        raw: &str,
        channel: Channel,
        now: Instant,
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.prune(now);
        self.seen
            .contains_key(&(subject.to_string(), raw.to_string(), channel))
    }

    /// Remembers an accepted scan.
    pub fn record(&mut self, subject: &str, raw: &str, channel: Channel, now: Instant) {
        if !self.is_enabled() {
            return;
        }
        self.seen
            .insert((subject.to_string(), raw.to_string(), channel), now);
    }

    fn prune(&mut self, now: Instant) {
        let window = self.window;
        self.seen
            .retain(|_, at| now.saturating_duration_since(*at) < window);
    }
}
