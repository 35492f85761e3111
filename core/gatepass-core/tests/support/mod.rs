//! Fake collaborators shared by the integration tests.
#![allow(dead_code)]

use chrono::Utc;
use gatepass_core::{
    ApiError, Channel, Entry, EntryStatus, GateApi, Notifier, RecordEntryRequest, ScannerConfig,
    Severity, StudentProfile, VerifiedSubject,
};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PAYLOAD: &str = r#"{"e":"a@x.com","d":"XYZ"}"#;

pub fn test_config() -> ScannerConfig {
    ScannerConfig {
        dedupe_window: Duration::ZERO,
        ..ScannerConfig::default()
    }
}

pub fn profile(name: &str, email: &str) -> StudentProfile {
    StudentProfile {
        name: name.to_string(),
        email: email.to_string(),
        hostel: Some("H1".to_string()),
        roll_number: None,
        room_number: None,
    }
}

pub fn entry(
    id: &str,
    email: &str,
    status: EntryStatus,
    same_hostel: bool,
    reason: Option<&str>,
) -> Entry {
    Entry {
        id: id.to_string(),
        subject_identifier: email.to_string(),
        student_name: None,
        status,
        channel: Channel::CheckIn,
        timestamp: Utc::now(),
        is_same_hostel: same_hostel,
        cross_hostel_reason: reason.map(str::to_string),
    }
}

pub struct FakeApi {
    pub verify_calls: Mutex<Vec<(String, String)>>,
    pub record_calls: Mutex<Vec<RecordEntryRequest>>,
    pub reason_calls: Mutex<Vec<(String, String)>>,
    pub list_calls: Mutex<usize>,
    verify_result: Mutex<Result<VerifiedSubject, ApiError>>,
    record_error: Mutex<Option<ApiError>>,
    recent: Mutex<Result<Vec<Entry>, ApiError>>,
    reason_error: Mutex<Option<ApiError>>,
    same_hostel: Mutex<bool>,
    verify_gate: Mutex<Option<Receiver<()>>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            verify_calls: Mutex::new(Vec::new()),
            record_calls: Mutex::new(Vec::new()),
            reason_calls: Mutex::new(Vec::new()),
            list_calls: Mutex::new(0),
            verify_result: Mutex::new(Ok(VerifiedSubject {
                profile: profile("Asha", "a@x.com"),
                last_entry: None,
            })),
            record_error: Mutex::new(None),
            recent: Mutex::new(Ok(Vec::new())),
            reason_error: Mutex::new(None),
            same_hostel: Mutex::new(true),
            verify_gate: Mutex::new(None),
        })
    }

    pub fn set_verify_result(&self, result: Result<VerifiedSubject, ApiError>) {
        *self.verify_result.lock().unwrap() = result;
    }

    pub fn set_last_entry(&self, last_entry: Option<Entry>) {
        self.set_verify_result(Ok(VerifiedSubject {
            profile: profile("Asha", "a@x.com"),
            last_entry,
        }));
    }

    pub fn fail_record(&self, err: ApiError) {
        *self.record_error.lock().unwrap() = Some(err);
    }

    pub fn set_recent(&self, recent: Result<Vec<Entry>, ApiError>) {
        *self.recent.lock().unwrap() = recent;
    }

    pub fn fail_reason(&self, err: ApiError) {
        *self.reason_error.lock().unwrap() = Some(err);
    }

    pub fn record_cross_hostel(&self) {
        *self.same_hostel.lock().unwrap() = false;
    }

    /// Makes the next verification block until the returned sender fires.
    pub fn hold_verification(&self) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        *self.verify_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn verify_count(&self) -> usize {
        self.verify_calls.lock().unwrap().len()
    }

    pub fn recorded(&self) -> Vec<RecordEntryRequest> {
        self.record_calls.lock().unwrap().clone()
    }
}

impl GateApi for FakeApi {
    fn verify_scan(
        &self,
        subject_identifier: &str,
        encrypted_body: &str,
    ) -> Result<VerifiedSubject, ApiError> {
        self.verify_calls
            .lock()
            .unwrap()
            .push((subject_identifier.to_string(), encrypted_body.to_string()));
        let gate = self.verify_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        self.verify_result.lock().unwrap().clone()
    }

    fn record_entry(&self, request: &RecordEntryRequest) -> Result<Entry, ApiError> {
        self.record_calls.lock().unwrap().push(request.clone());
        if let Some(err) = self.record_error.lock().unwrap().clone() {
            return Err(err);
        }
        let count = self.record_calls.lock().unwrap().len();
        let mut recorded = entry(
            &format!("entry-{}", count),
            &request.subject_identifier,
            request.status,
            *self.same_hostel.lock().unwrap(),
            None,
        );
        recorded.channel = request.channel;
        Ok(recorded)
    }

    fn list_recent_entries(&self) -> Result<Vec<Entry>, ApiError> {
        *self.list_calls.lock().unwrap() += 1;
        self.recent.lock().unwrap().clone()
    }

    fn set_cross_hostel_reason(&self, entry_id: &str, reason: &str) -> Result<(), ApiError> {
        self.reason_calls
            .lock()
            .unwrap()
            .push((entry_id.to_string(), reason.to_string()));
        match self.reason_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, s)| *s == severity)
            .map(|(message, _)| message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}
