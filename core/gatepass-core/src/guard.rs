//! Single-flight processing guard.
//!
//! A capacity-1 slot: [`ProcessingGuard::try_acquire`] either claims the slot
//! or reports it busy. The caller drops busy scans rather than queueing them.
//! The claim is released when its [`GuardHandle`] drops, which covers early
//! returns and panics on the worker thread alike.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ProcessingGuard {
    held: Arc<AtomicBool>,
}

impl ProcessingGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot, or returns `None` if a scan is already in flight.
    pub fn try_acquire(&self) -> Option<GuardHandle> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GuardHandle {
                held: Arc::clone(&self.held),
            })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Proof of holding the processing slot.
#[derive(Debug)]
pub struct GuardHandle {
    held: Arc<AtomicBool>,
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}
