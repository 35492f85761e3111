//! Cross-hostel justification workflow.
//!
//! Runs outside the scan pipeline: an operator picks an entry from the
//! pending cross-hostel set and attaches a reason. It does not take the
//! processing guard, so it never blocks scanning.

use crate::error::ReasonError;
use crate::notify::Severity;
use crate::pipeline::ScanPipeline;

impl ScanPipeline {
    /// Saves `reason` for `entry_id` and reloads the roster. A failed reload
    /// is reported but does not fail the call; the reason is already saved.
    pub fn submit_cross_hostel_reason(
        &self,
        entry_id: &str,
        reason: &str,
    ) -> Result<(), ReasonError> {
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            let err = ReasonError::Blank;
            self.notifier.notify(&err.notification(), Severity::Error);
            return Err(err);
        }

        let id = entry_id.to_string();
        let saved = self.call_bounded("set_cross_hostel_reason", move |api| {
            api.set_cross_hostel_reason(&id, &reason)
        });
        if let Err(err) = saved {
            tracing::warn!(entry_id, error = %err, "Saving cross-hostel reason failed");
            let err = ReasonError::Save(err);
            self.notifier.notify(&err.notification(), Severity::Error);
            return Err(err);
        }

        tracing::info!(entry_id, "Cross-hostel reason saved");
        self.notifier
            .notify("Reason saved successfully", Severity::Success);
        let _ = self.refresh_roster();
        Ok(())
    }
}
