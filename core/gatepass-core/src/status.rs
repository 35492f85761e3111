//! Maps a scan channel and the subject's last entry to the status to record.
//! The backend has the final word; this only proposes.

use gatepass_protocol::{Channel, Entry, EntryStatus};

pub fn derive_status(channel: Channel, last_entry: Option<&Entry>) -> EntryStatus {
    match channel {
        Channel::CheckIn => EntryStatus::CheckedIn,
        Channel::CheckOut => EntryStatus::CheckedOut,
        Channel::Auto => match last_entry.map(|entry| entry.status) {
            None | Some(EntryStatus::CheckedOut) => EntryStatus::CheckedIn,
            Some(EntryStatus::CheckedIn) => EntryStatus::CheckedOut,
        },
    }
}
