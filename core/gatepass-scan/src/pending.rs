//! `pending` and `reason`: the cross-hostel reason workflow.

use crate::terminal::TerminalNotifier;
use crate::CommandError;
use chrono::Local;
use gatepass_core::{Entry, GateApi, ScanPipeline, ScannerConfig};
use std::sync::Arc;

pub fn run_pending(config: &ScannerConfig, api: Arc<dyn GateApi>) -> Result<(), CommandError> {
    let pipeline = ScanPipeline::new(api, Arc::new(TerminalNotifier::default()), config);
    let pending = pipeline
        .refresh_roster()
        .map_err(|_| CommandError::Reported)?;

    if pending.is_empty() {
        println!("No cross-hostel check-ins awaiting a reason.");
        return Ok(());
    }

    for entry in &pending {
        println!("{}", format_pending(entry));
    }
    Ok(())
}

pub fn run_reason(
    config: &ScannerConfig,
    api: Arc<dyn GateApi>,
    entry_id: &str,
    reason: &str,
) -> Result<(), CommandError> {
    let pipeline = ScanPipeline::new(api, Arc::new(TerminalNotifier::default()), config);
    pipeline
        .submit_cross_hostel_reason(entry_id, reason)
        .map_err(|_| CommandError::Reported)
}

fn format_pending(entry: &Entry) -> String {
    let when = entry
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M");
    let name = entry
        .student_name
        .as_deref()
        .unwrap_or(entry.subject_identifier.as_str());
    format!(
        "{}  {}  {} <{}>",
        entry.id, when, name, entry.subject_identifier
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gatepass_core::{ApiError, Channel, EntryStatus, RecordEntryRequest, VerifiedSubject};

    struct OfflineApi;

    impl GateApi for OfflineApi {
        fn verify_scan(&self, _: &str, _: &str) -> Result<VerifiedSubject, ApiError> {
            Err(ApiError::Transport("offline".to_string()))
        }

        fn record_entry(&self, _: &RecordEntryRequest) -> Result<Entry, ApiError> {
            Err(ApiError::Transport("offline".to_string()))
        }

        fn list_recent_entries(&self) -> Result<Vec<Entry>, ApiError> {
            Err(ApiError::Transport("offline".to_string()))
        }

        fn set_cross_hostel_reason(&self, _: &str, _: &str) -> Result<(), ApiError> {
            Err(ApiError::Transport("offline".to_string()))
        }
    }

    #[test]
    fn notified_failures_are_not_reported_again() {
        let config = ScannerConfig::default();
        assert_eq!(
            run_pending(&config, Arc::new(OfflineApi)),
            Err(CommandError::Reported)
        );
        assert_eq!(
            run_reason(&config, Arc::new(OfflineApi), "66f0a1", "visiting"),
            Err(CommandError::Reported)
        );
        assert_eq!(
            run_reason(&config, Arc::new(OfflineApi), "66f0a1", "  "),
            Err(CommandError::Reported)
        );
    }

    fn entry(name: Option<&str>) -> Entry {
        Entry {
            id: "66f0a1".to_string(),
            subject_identifier: "a@x.com".to_string(),
            student_name: name.map(str::to_string),
            status: EntryStatus::CheckedIn,
            channel: Channel::CheckIn,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap(),
            is_same_hostel: false,
            cross_hostel_reason: None,
        }
    }

    #[test]
    fn pending_line_shows_id_and_name() {
        let line = format_pending(&entry(Some("Asha")));
        assert!(line.starts_with("66f0a1  "));
        assert!(line.ends_with("Asha <a@x.com>"));
    }

    #[test]
    fn pending_line_falls_back_to_email() {
        let line = format_pending(&entry(None));
        assert!(line.ends_with("a@x.com <a@x.com>"));
    }
}
