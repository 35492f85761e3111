//! Scanner session: the key listener for one operator.
//!
//! Owns the accumulator (buffer and inactivity timer) and a handle to the
//! shared pipeline. Construct one when the operator's view opens and drop it
//! when the view closes; dropping clears any pending fragment.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crate::accumulator::{KeyOutcome, ScanAccumulator};
use crate::config::{Role, ScannerConfig};
use crate::keys::KeyPress;
use crate::pipeline::{ScanOutcome, ScanPipeline, Submission};
use crate::timer::InactivityTimer;

pub struct ScannerSession {
    role: Role,
    accumulator: ScanAccumulator,
    pipeline: Arc<ScanPipeline>,
    in_flight: Option<JoinHandle<ScanOutcome>>,
}

impl ScannerSession {
    pub fn start(config: &ScannerConfig, pipeline: Arc<ScanPipeline>) -> Self {
        let session = Self {
            role: config.role,
            accumulator: ScanAccumulator::new(
                config.terminators.clone(),
                InactivityTimer::new(config.inactivity_window),
            ),
            pipeline,
            in_flight: None,
        };

        if session.is_engaged() {
            tracing::info!(
                check_in_key = %config.terminators.check_in,
                check_out_key = %config.terminators.check_out,
                "Scanner session started"
            );
        } else {
            tracing::info!(role = ?config.role, "Scanner inactive for this role");
        }
        session
    }

    /// False when the operator's role does not drive the scanner; every key
    /// is then passed through untouched.
    pub fn is_engaged(&self) -> bool {
        self.role.is_scanner_operator()
    }

    pub fn pipeline(&self) -> &Arc<ScanPipeline> {
        &self.pipeline
    }

    pub fn buffer(&self) -> &str {
        self.accumulator.buffer()
    }

    pub fn handle_key(&mut self, press: &KeyPress) -> KeyOutcome {
        self.handle_key_at(press, Instant::now())
    }

    pub fn handle_key_at(&mut self, press: &KeyPress, now: Instant) -> KeyOutcome {
        if !self.is_engaged() {
            return KeyOutcome::Ignored;
        }

        let outcome = self.accumulator.on_key(press, now);
        if let KeyOutcome::Flushed(scan) = &outcome {
            tracing::debug!(
                scan_id = %scan.scan_id,
                channel = scan.channel.as_str(),
                chars = scan.raw.chars().count(),
                "Scan completed"
            );
            if let Submission::Started(handle) = self.pipeline.submit(scan.clone()) {
                self.in_flight = Some(handle);
            }
        }
        outcome
    }

    /// Lets the inactivity timer fire. Call periodically from the host loop.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> bool {
        self.accumulator.tick(now)
    }

    /// Blocks until the most recently accepted scan finishes.
    pub fn wait_for_in_flight(&mut self) -> Option<ScanOutcome> {
        let handle = self.in_flight.take()?;
        match handle.join() {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                tracing::error!("Scan worker panicked");
                None
            }
        }
    }
}

impl Drop for ScannerSession {
    fn drop(&mut self) {
        self.accumulator.reset();
        tracing::debug!("Scanner session closed");
    }
}
