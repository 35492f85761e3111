//! Backend collaborator used by the pipeline.
//!
//! Implementations are expected to bound their own transport time; the
//! pipeline adds a second deadline on top (see [`crate::ScanPipeline`]).

use gatepass_protocol::{Entry, RecordEntryRequest, VerifiedSubject};

use crate::error::ApiError;

pub trait GateApi: Send + Sync {
    /// Resolves a scanned payload to a student and their last entry.
    fn verify_scan(
        &self,
        subject_identifier: &str,
        encrypted_body: &str,
    ) -> Result<VerifiedSubject, ApiError>;

    fn record_entry(&self, request: &RecordEntryRequest) -> Result<Entry, ApiError>;

    fn list_recent_entries(&self) -> Result<Vec<Entry>, ApiError>;

    fn set_cross_hostel_reason(&self, entry_id: &str, reason: &str) -> Result<(), ApiError>;
}
