//! Wire types and validation for the gate scanner.
//!
//! This crate is shared by the scanner pipeline and its HTTP binding so the
//! two cannot drift apart. The backend remains the authority on entries; the
//! scanner only proposes a status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on a single scan. Hardware scanners emit a few hundred
/// characters; anything past this is a stuck key or a paste.
pub const MAX_SCAN_CHARS: usize = 8192;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Which scanner stream produced a scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    CheckIn,
    CheckOut,
    /// Toggle from the subject's last known status.
    Auto,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::CheckIn => "check_in",
            Channel::CheckOut => "check_out",
            Channel::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    CheckedIn,
    CheckedOut,
}

impl EntryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EntryStatus::CheckedIn => "checked in",
            EntryStatus::CheckedOut => "checked out",
        }
    }
}

/// Decoded QR content. The scanner never sees plaintext beyond the subject
/// identifier; `encrypted_body` is forwarded to the backend untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanPayload {
    #[serde(rename = "e", alias = "email")]
    pub subject_identifier: String,
    #[serde(rename = "d", alias = "data")]
    pub encrypted_body: String,
}

impl ScanPayload {
    pub fn validate(&self) -> Result<(), ErrorInfo> {
        require_text(&self.subject_identifier, "subject identifier")?;
        require_text(&self.encrypted_body, "encrypted body")?;
        Ok(())
    }
}

/// Parses a flushed scan buffer into a payload.
pub fn parse_scan_payload(raw: &str) -> Result<ScanPayload, ErrorInfo> {
    if raw.chars().count() > MAX_SCAN_CHARS {
        return Err(ErrorInfo::new(
            "scan_too_large",
            format!("scan exceeds {} characters", MAX_SCAN_CHARS),
        ));
    }

    let payload: ScanPayload = serde_json::from_str(raw).map_err(|err| {
        ErrorInfo::new(
            "invalid_payload",
            format!("scan is not a valid QR payload: {}", err),
        )
    })?;
    payload.validate()?;
    Ok(payload)
}

fn require_text(value: &str, field: &str) -> Result<(), ErrorInfo> {
    if value.trim().is_empty() {
        return Err(ErrorInfo::new(
            "missing_field",
            format!("{} is required", field),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub hostel: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub room_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    #[serde(rename = "email")]
    pub subject_identifier: String,
    #[serde(default)]
    pub student_name: Option<String>,
    pub status: EntryStatus,
    pub channel: Channel,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_same_hostel")]
    pub is_same_hostel: bool,
    #[serde(default, rename = "reason")]
    pub cross_hostel_reason: Option<String>,
}

fn default_same_hostel() -> bool {
    true
}

impl Entry {
    /// True when the entry is a cross-hostel check-in still waiting for a
    /// justification.
    pub fn needs_cross_hostel_reason(&self) -> bool {
        self.status == EntryStatus::CheckedIn
            && !self.is_same_hostel
            && self
                .cross_hostel_reason
                .as_deref()
                .map(|reason| reason.trim().is_empty())
                .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedSubject {
    #[serde(rename = "studentProfile")]
    pub profile: StudentProfile,
    #[serde(default)]
    pub last_entry: Option<Entry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyScanRequest {
    pub email: String,
    pub encrypted_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordEntryRequest {
    #[serde(rename = "email")]
    pub subject_identifier: String,
    pub status: EntryStatus,
    pub channel: Channel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrossHostelReasonRequest {
    pub reason: String,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn best_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: EntryStatus, same_hostel: bool, reason: Option<&str>) -> Entry {
        Entry {
            id: "entry-1".to_string(),
            subject_identifier: "a@x.com".to_string(),
            student_name: Some("Asha".to_string()),
            status,
            channel: Channel::CheckIn,
            timestamp: "2026-01-30T12:00:00Z".parse().expect("timestamp"),
            is_same_hostel: same_hostel,
            cross_hostel_reason: reason.map(str::to_string),
        }
    }

    #[test]
    fn parses_short_keys() {
        let payload = parse_scan_payload(r#"{"e":"a@x.com","d":"XYZ"}"#).expect("payload");
        assert_eq!(payload.subject_identifier, "a@x.com");
        assert_eq!(payload.encrypted_body, "XYZ");
    }

    #[test]
    fn parses_long_key_aliases() {
        let payload =
            parse_scan_payload(r#"{"email":"a@x.com","data":"XYZ"}"#).expect("payload");
        assert_eq!(payload.subject_identifier, "a@x.com");
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_scan_payload("not valid json").unwrap_err();
        assert_eq!(err.code, "invalid_payload");
    }

    #[test]
    fn rejects_missing_body() {
        let err = parse_scan_payload(r#"{"e":"a@x.com"}"#).unwrap_err();
        assert_eq!(err.code, "invalid_payload");
    }

    #[test]
    fn rejects_blank_identifier() {
        let err = parse_scan_payload(r#"{"e":"  ","d":"XYZ"}"#).unwrap_err();
        assert_eq!(err.code, "missing_field");
    }

    #[test]
    fn rejects_oversized_scan() {
        let raw = "x".repeat(MAX_SCAN_CHARS + 1);
        let err = parse_scan_payload(&raw).unwrap_err();
        assert_eq!(err.code, "scan_too_large");
    }

    #[test]
    fn cross_hostel_check_in_without_reason_is_pending() {
        assert!(entry(EntryStatus::CheckedIn, false, None).needs_cross_hostel_reason());
        assert!(entry(EntryStatus::CheckedIn, false, Some(" ")).needs_cross_hostel_reason());
    }

    #[test]
    fn same_hostel_or_explained_entries_are_not_pending() {
        assert!(!entry(EntryStatus::CheckedIn, true, None).needs_cross_hostel_reason());
        assert!(!entry(EntryStatus::CheckedIn, false, Some("visiting")).needs_cross_hostel_reason());
        assert!(!entry(EntryStatus::CheckedOut, false, None).needs_cross_hostel_reason());
    }

    #[test]
    fn entry_reads_backend_field_names() {
        let json = r#"{
            "id": "e1",
            "email": "a@x.com",
            "studentName": "Asha",
            "status": "checked_in",
            "channel": "check_out",
            "timestamp": "2026-01-30T12:00:00Z",
            "isSameHostel": false
        }"#;
        let parsed: Entry = serde_json::from_str(json).expect("entry");
        assert_eq!(parsed.status, EntryStatus::CheckedIn);
        assert_eq!(parsed.channel, Channel::CheckOut);
        assert!(!parsed.is_same_hostel);
        assert_eq!(parsed.cross_hostel_reason, None);
    }

    #[test]
    fn error_body_prefers_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"Student not found","error":"x"}"#).expect("body");
        assert_eq!(body.best_message(), Some("Student not found"));
        assert_eq!(ErrorBody::default().best_message(), None);
    }
}
