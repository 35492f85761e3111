//! Recent-entries roster and the pending cross-hostel view derived from it.
//!
//! The pending set is never edited directly. Every refresh replaces the
//! entries and rebuilds the view from scratch.

use chrono::{DateTime, Utc};
use gatepass_protocol::Entry;
use std::sync::{Arc, Mutex};

pub type SharedRoster = Arc<Mutex<Roster>>;

#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<Entry>,
    pending_cross_hostel: Vec<Entry>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Roster {
    pub fn shared() -> SharedRoster {
        Arc::new(Mutex::new(Roster::default()))
    }

    pub fn replace(&mut self, entries: Vec<Entry>, refreshed_at: DateTime<Utc>) {
        self.pending_cross_hostel = pending_cross_hostel(&entries);
        self.entries = entries;
        self.refreshed_at = Some(refreshed_at);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn pending_cross_hostel(&self) -> &[Entry] {
        &self.pending_cross_hostel
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}

/// Check-ins by subjects from another hostel that still lack a reason.
pub fn pending_cross_hostel(entries: &[Entry]) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| entry.needs_cross_hostel_reason())
        .cloned()
        .collect()
}
