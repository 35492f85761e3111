//! Scan processing pipeline.
//!
//! ## Per-scan flow
//!
//! ```text
//! Flushed → Parsed → Verified → Derived → Recorded → RosterRefreshed
//!    │         │         │                    │
//!    └ parse   └ verify  └ record             └ refresh (entry already saved)
//! ```
//!
//! Every exit path returns the processing guard. Failures are reported once
//! through the [`Notifier`] and returned in the [`ScanOutcome`].

use chrono::Utc;
use gatepass_protocol::{parse_scan_payload, Entry, RecordEntryRequest, StudentProfile};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::accumulator::CompletedScan;
use crate::api::GateApi;
use crate::config::ScannerConfig;
use crate::dedupe::DedupeWindow;
use crate::error::{ApiError, ScanError};
use crate::guard::{GuardHandle, ProcessingGuard};
use crate::notify::{Notifier, Severity};
use crate::roster::{Roster, SharedRoster};
use crate::status::derive_status;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Recorded {
        entry: Entry,
        profile: StudentProfile,
        /// Set when the entry was saved but the roster could not be reloaded.
        refresh_error: Option<ScanError>,
    },
    /// Same payload was recorded moments ago; nothing sent to the backend.
    Duplicate,
    Failed(ScanError),
}

/// Result of handing a scan to the pipeline.
#[derive(Debug)]
pub enum Submission {
    /// Another scan holds the processing slot.
    Dropped,
    Started(JoinHandle<ScanOutcome>),
}

pub struct ScanPipeline {
    pub(crate) api: Arc<dyn GateApi>,
    pub(crate) notifier: Arc<dyn Notifier>,
    roster: SharedRoster,
    guard: ProcessingGuard,
    dedupe: Mutex<DedupeWindow>,
    request_timeout: Duration,
}

impl ScanPipeline {
    pub fn new(
        api: Arc<dyn GateApi>,
        notifier: Arc<dyn Notifier>,
        config: &ScannerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            api,
            notifier,
            roster: Roster::shared(),
            guard: ProcessingGuard::new(),
            dedupe: Mutex::new(DedupeWindow::new(config.dedupe_window)),
            request_timeout: config.request_timeout,
        })
    }

    pub fn roster(&self) -> SharedRoster {
        Arc::clone(&self.roster)
    }

    pub fn roster_snapshot(&self) -> Roster {
        self.roster
            .lock()
            .map(|roster| roster.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn is_busy(&self) -> bool {
        self.guard.is_held()
    }

    /// Claims the processing slot and runs the scan on a worker thread.
    /// Scans arriving while the slot is held are dropped.
    pub fn submit(self: &Arc<Self>, scan: CompletedScan) -> Submission {
        let Some(claim) = self.guard.try_acquire() else {
            tracing::debug!(
                scan_id = %scan.scan_id,
                channel = scan.channel.as_str(),
                "Scan dropped; another scan is in flight"
            );
            return Submission::Dropped;
        };

        let pipeline = Arc::clone(self);
        let worker = thread::Builder::new()
            .name("gatepass-scan".to_string())
            .spawn(move || pipeline.run(&scan, claim));

        match worker {
            Ok(handle) => Submission::Started(handle),
            Err(err) => {
                tracing::error!(error = %err, "Failed to spawn scan worker");
                self.notifier
                    .notify("Scanner is busy. Please scan again.", Severity::Error);
                Submission::Dropped
            }
        }
    }

    /// Processes a scan on the calling thread. Returns `None` when the scan
    /// was dropped because another one is in flight.
    pub fn process(&self, scan: &CompletedScan) -> Option<ScanOutcome> {
        let claim = self.guard.try_acquire()?;
        Some(self.run(scan, claim))
    }

    fn run(&self, scan: &CompletedScan, claim: GuardHandle) -> ScanOutcome {
        let started = Instant::now();
        let outcome = self.execute(scan);
        drop(claim);

        tracing::debug!(
            scan_id = %scan.scan_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scan processing finished"
        );
        outcome
    }

    fn execute(&self, scan: &CompletedScan) -> ScanOutcome {
        let payload = match parse_scan_payload(&scan.raw) {
            Ok(payload) => payload,
            Err(info) => return self.fail(scan, ScanError::Malformed(info.message)),
        };

        if self.is_duplicate(&payload.subject_identifier, scan) {
            tracing::info!(
                scan_id = %scan.scan_id,
                subject = %payload.subject_identifier,
                "Duplicate scan ignored"
            );
            self.notifier
                .notify("Duplicate scan ignored.", Severity::Info);
            return ScanOutcome::Duplicate;
        }

        let subject_identifier = payload.subject_identifier.clone();
        let verified = match self.call_bounded("verify_scan", move |api| {
            api.verify_scan(&payload.subject_identifier, &payload.encrypted_body)
        }) {
            Ok(verified) => verified,
            Err(err) => return self.fail(scan, ScanError::Verification(err)),
        };

        let status = derive_status(scan.channel, verified.last_entry.as_ref());
        tracing::debug!(
            scan_id = %scan.scan_id,
            channel = scan.channel.as_str(),
            last_status = ?verified.last_entry.as_ref().map(|entry| entry.status),
            status = ?status,
            "Status derived"
        );

        let request = RecordEntryRequest {
            subject_identifier: subject_identifier.clone(),
            status,
            channel: scan.channel,
        };
        let entry = match self.call_bounded("record_entry", move |api| api.record_entry(&request))
        {
            Ok(entry) => entry,
            Err(err) => {
                // The detached call may still land; block an immediate re-scan.
                if matches!(err, ApiError::Timeout { .. }) {
                    self.remember(&subject_identifier, scan);
                }
                return self.fail(scan, ScanError::Record(err));
            }
        };
        self.remember(&subject_identifier, scan);

        tracing::info!(
            scan_id = %scan.scan_id,
            entry_id = %entry.id,
            subject = %subject_identifier,
            status = ?entry.status,
            channel = scan.channel.as_str(),
            "Entry recorded"
        );

        let refresh_error = self.reload_roster().err().map(ScanError::Refresh);

        self.notifier.notify(
            &format!(
                "{} {} successfully",
                display_name(&verified.profile),
                entry.status.label()
            ),
            Severity::Success,
        );

        if let Some(err) = &refresh_error {
            tracing::warn!(scan_id = %scan.scan_id, error = %err, "Roster refresh failed");
            self.notifier.notify(&err.notification(), Severity::Error);
        }

        ScanOutcome::Recorded {
            entry,
            profile: verified.profile,
            refresh_error,
        }
    }

    /// Reloads recent entries and returns the rebuilt pending cross-hostel
    /// set. Failures are reported to the notifier.
    pub fn refresh_roster(&self) -> Result<Vec<Entry>, ApiError> {
        match self.reload_roster() {
            Ok(pending) => Ok(pending),
            Err(err) => {
                tracing::warn!(error = %err, "Roster refresh failed");
                self.notifier.notify(
                    &ScanError::Refresh(err.clone()).notification(),
                    Severity::Error,
                );
                Err(err)
            }
        }
    }

    pub(crate) fn reload_roster(&self) -> Result<Vec<Entry>, ApiError> {
        let entries = self.call_bounded("list_recent_entries", |api| api.list_recent_entries())?;
        let mut roster = self
            .roster
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        roster.replace(entries, Utc::now());
        tracing::debug!(
            entries = roster.entries().len(),
            pending_cross_hostel = roster.pending_cross_hostel().len(),
            "Roster refreshed"
        );
        Ok(roster.pending_cross_hostel().to_vec())
    }

    /// Runs a backend call with a deadline so a hung request cannot hold the
    /// processing slot forever. A zero timeout calls inline.
    pub(crate) fn call_bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn GateApi) -> Result<T, ApiError> + Send + 'static,
    {
        if self.request_timeout.is_zero() {
            return call(self.api.as_ref());
        }

        let api = Arc::clone(&self.api);
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name(format!("gatepass-{}", operation))
            .spawn(move || {
                let _ = tx.send(call(api.as_ref()));
            })
            .map_err(|err| {
                ApiError::Transport(format!("failed to start {} call: {}", operation, err))
            })?;

        match rx.recv_timeout(self.request_timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ApiError::Timeout {
                operation,
                after: self.request_timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(ApiError::Transport(format!(
                "{} call ended without a response",
                operation
            ))),
        }
    }

    fn fail(&self, scan: &CompletedScan, err: ScanError) -> ScanOutcome {
        tracing::warn!(
            scan_id = %scan.scan_id,
            stage = err.stage(),
            error = %err,
            "Scan failed"
        );
        self.notifier.notify(&err.notification(), Severity::Error);
        ScanOutcome::Failed(err)
    }

    fn is_duplicate(&self, subject: &str, scan: &CompletedScan) -> bool {
        self.dedupe
            .lock()
            .map(|mut dedupe| {
                dedupe.is_duplicate(subject, &scan.raw, scan.channel, Instant::now())
            })
            .unwrap_or(false)
    }

    fn remember(&self, subject: &str, scan: &CompletedScan) {
        if let Ok(mut dedupe) = self.dedupe.lock() {
            dedupe.record(subject, &scan.raw, scan.channel, Instant::now());
        }
    }
}

fn display_name(profile: &StudentProfile) -> &str {
    let name = profile.name.trim();
    if name.is_empty() {
        profile.email.as_str()
    } else {
        name
    }
}
