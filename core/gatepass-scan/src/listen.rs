//! `listen`: the gate terminal loop.
//!
//! Polls crossterm for key events, feeds them to the scanner session, and
//! ticks the inactivity timer between events so abandoned fragments expire
//! even when no further key arrives.

use crate::terminal::{self, RawModeGuard, TerminalNotifier};
use crossterm::event::{self, Event};
use gatepass_core::{GateApi, Notifier, ScanPipeline, ScannerConfig, ScannerSession, Severity};
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL_MS: u64 = 100;

pub fn run(config: &ScannerConfig, api: Arc<dyn GateApi>) -> Result<(), String> {
    if !config.role.is_scanner_operator() {
        return Err(format!(
            "role {:?} does not operate the gate scanner (set role = \"security\")",
            config.role
        ));
    }

    let notifier = Arc::new(TerminalNotifier::default());
    let pipeline = ScanPipeline::new(api, notifier.clone(), config);

    if let Ok(pending) = pipeline.refresh_roster() {
        if !pending.is_empty() {
            notifier.notify(
                &format!(
                    "{} cross-hostel check-in(s) awaiting a reason (see `gatepass-scan pending`)",
                    pending.len()
                ),
                Severity::Info,
            );
        }
    }

    let _raw_mode = RawModeGuard::enter().map_err(|err| err.to_string())?;
    notifier.notify(
        &format!(
            "Ready. {} = check in, {} = check out. Ctrl+C to quit.",
            config.terminators.check_in, config.terminators.check_out
        ),
        Severity::Info,
    );

    let mut session = ScannerSession::start(config, pipeline);
    let result = event_loop(&mut session);

    // Drain so the last scan's notification prints before raw mode ends.
    session.wait_for_in_flight();
    tracing::info!("Scanner session stopped");
    result
}

fn event_loop(session: &mut ScannerSession) -> Result<(), String> {
    let poll_interval = Duration::from_millis(POLL_INTERVAL_MS);
    loop {
        if event::poll(poll_interval).map_err(|err| err.to_string())? {
            if let Event::Key(key) = event::read().map_err(|err| err.to_string())? {
                if terminal::is_quit(&key) {
                    return Ok(());
                }
                if let Some(press) = terminal::key_press(&key) {
                    session.handle_key(&press);
                }
            }
        }
        if session.tick() {
            tracing::debug!("Discarded partial scan after inactivity");
        }
    }
}
