//! Keystroke accumulator and terminator detection.
//!
//! ## State Machine
//!
//! ```text
//! Idle ──printable──▶ Accumulating ──printable──▶ Accumulating (timer re-armed)
//! Accumulating ──terminator──▶ Flushed ──▶ Idle   (scan emitted if non-blank)
//! Accumulating ──window elapsed──▶ Reset ──▶ Idle (nothing emitted)
//! ```
//!
//! Presses whose focus is an editable region never reach the buffer.

use gatepass_protocol::{Channel, MAX_SCAN_CHARS};
use std::time::Instant;
use ulid::Ulid;

use crate::keys::{Key, KeyPress};
use crate::timer::InactivityTimer;

/// Terminator bindings. Each terminator flushes the buffer on its channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminatorKeys {
    pub check_in: Key,
    pub check_out: Key,
    pub auto: Option<Key>,
}

impl TerminatorKeys {
    pub fn channel_for(&self, key: &Key) -> Option<Channel> {
        if *key == self.check_in {
            Some(Channel::CheckIn)
        } else if *key == self.check_out {
            Some(Channel::CheckOut)
        } else if self.auto.as_ref() == Some(key) {
            Some(Channel::Auto)
        } else {
            None
        }
    }
}

impl Default for TerminatorKeys {
    fn default() -> Self {
        Self {
            check_in: Key::Enter,
            check_out: Key::Tab,
            auto: None,
        }
    }
}

/// A buffer flushed by a terminator key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedScan {
    pub scan_id: String,
    pub raw: String,
    pub channel: Channel,
}

impl CompletedScan {
    pub fn new(raw: impl Into<String>, channel: Channel) -> Self {
        Self {
            scan_id: Ulid::new().to_string(),
            raw: raw.into(),
            channel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not for the scanner; the host should handle the key normally.
    Ignored,
    /// Character appended to the pending scan.
    Buffered,
    /// Terminator pressed with nothing pending.
    EmptyTerminator,
    Flushed(CompletedScan),
}

impl KeyOutcome {
    /// Whether the host should swallow the key's default action.
    pub fn suppress_default(&self) -> bool {
        matches!(self, KeyOutcome::EmptyTerminator | KeyOutcome::Flushed(_))
    }
}

#[derive(Debug)]
pub struct ScanAccumulator {
    buffer: String,
    buffered_chars: usize,
    timer: InactivityTimer,
    terminators: TerminatorKeys,
}

impl ScanAccumulator {
    pub fn new(terminators: TerminatorKeys, timer: InactivityTimer) -> Self {
        Self {
            buffer: String::new(),
            buffered_chars: 0,
            timer,
            terminators,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn on_key(&mut self, press: &KeyPress, now: Instant) -> KeyOutcome {
        if press.focus.is_scan_exempt() {
            return KeyOutcome::Ignored;
        }

        // A fragment older than the window must not merge with this key.
        self.tick(now);

        if let Some(channel) = self.terminators.channel_for(&press.key) {
            return self.flush(channel);
        }

        match press.key.printable_char() {
            Some(c) => {
                self.push(c, now);
                KeyOutcome::Buffered
            }
            None => KeyOutcome::Ignored,
        }
    }

    /// Clears the buffer if the inactivity window has elapsed. Returns true
    /// when a pending fragment was discarded.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.timer.is_expired(now) {
            return false;
        }
        let discarded = !self.buffer.is_empty();
        if discarded {
            tracing::debug!(
                chars = self.buffered_chars,
                "Scan buffer reset after inactivity"
            );
        }
        self.reset();
        discarded
    }

    /// Drops any pending fragment and disarms the timer.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.buffered_chars = 0;
        self.timer.clear();
    }

    fn push(&mut self, c: char, now: Instant) {
        if self.buffered_chars >= MAX_SCAN_CHARS {
            tracing::warn!(
                limit = MAX_SCAN_CHARS,
                "Scan buffer overflow; discarding pending input"
            );
            self.reset();
        }
        self.buffer.push(c);
        self.buffered_chars += 1;
        self.timer.arm(now);
    }

    fn flush(&mut self, channel: Channel) -> KeyOutcome {
        let raw = self.buffer.trim().to_string();
        self.reset();
        if raw.is_empty() {
            return KeyOutcome::EmptyTerminator;
        }
        KeyOutcome::Flushed(CompletedScan::new(raw, channel))
    }
}
