//! Error types for gatepass-core operations.
//!
//! Every scan failure ends up as a single operator notification, so each
//! variant carries a message fit for display.

use std::path::PathBuf;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// Collaborator Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Failure reported by a [`crate::GateApi`] call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Server-provided message when the backend sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { message } | ApiError::Rejected { message, .. } => {
                Some(message.as_str()).filter(|message| !message.trim().is_empty())
            }
            _ => None,
        }
    }

    /// Best message to show the operator, falling back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Timeout { .. } => format!("{} (request timed out)", fallback),
            _ => self
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scan Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Stage at which processing of a single scan failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// Buffer was not a `{e, d}` JSON payload.
    #[error("Malformed scan: {0}")]
    Malformed(String),

    /// Subject unknown or the backend refused the scan. No entry exists.
    #[error("Verification failed: {0}")]
    Verification(ApiError),

    /// Verified, but the entry was not persisted. Operator must re-scan.
    #[error("Recording entry failed: {0}")]
    Record(ApiError),

    /// Entry persisted; roster is stale until the next refresh.
    #[error("Roster refresh failed: {0}")]
    Refresh(ApiError),
}

impl ScanError {
    /// Message handed to the notification sink.
    pub fn notification(&self) -> String {
        match self {
            ScanError::Malformed(_) => "Invalid QR code. Please scan again.".to_string(),
            ScanError::Verification(err) => err.user_message("Failed to verify QR code"),
            ScanError::Record(err) => err.user_message("Failed to record entry"),
            ScanError::Refresh(err) => err.user_message("Failed to refresh recent entries"),
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            ScanError::Malformed(_) => "parse",
            ScanError::Verification(_) => "verify",
            ScanError::Record(_) => "record",
            ScanError::Refresh(_) => "refresh",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Cross-Hostel Reason Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReasonError {
    #[error("Reason must not be empty")]
    Blank,

    #[error("Saving reason failed: {0}")]
    Save(ApiError),
}

impl ReasonError {
    pub fn notification(&self) -> String {
        match self {
            ReasonError::Blank => "Please enter a reason for the cross-hostel entry.".to_string(),
            ReasonError::Save(err) => err.user_message("Failed to save reason"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Home directory not found")]
    HomeNotFound,

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Configuration read failed: {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown key name: {0}")]
    InvalidKey(String),

    #[error("Unknown operator role: {0}")]
    InvalidRole(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for Results using GateError.
pub type Result<T> = std::result::Result<T, GateError>;
