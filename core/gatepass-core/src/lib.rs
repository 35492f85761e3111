//! # gatepass-core
//!
//! Decoder and entry pipeline for keyboard-wedge QR scanners at hostel gates.
//!
//! A scanner types its payload as ordinary key presses and finishes with a
//! terminator key. [`ScannerSession`] turns that key stream back into discrete
//! scans, and [`ScanPipeline`] verifies each scan with the backend, derives the
//! next status and records the entry.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime. Accepted scans run on a worker thread
//!   so key handling never blocks on the network.
//! - **Single-flight**: At most one scan is processed at a time; scans that
//!   arrive while busy are dropped, not queued.
//! - **Collaborators behind traits**: The backend ([`GateApi`]) and the UI sink
//!   ([`Notifier`]) are injected, which keeps the pipeline testable.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gatepass_core::{ScannerConfig, ScanPipeline, ScannerSession};
//!
//! let config = ScannerConfig::load(None)?;
//! let pipeline = ScanPipeline::new(api, notifier, &config);
//! let mut session = ScannerSession::start(&config, pipeline);
//! session.handle_key(press);
//! ```

pub mod accumulator;
pub mod api;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod guard;
pub mod keys;
pub mod notify;
pub mod pipeline;
pub mod reason;
pub mod roster;
pub mod session;
pub mod status;
pub mod timer;

pub use accumulator::{CompletedScan, KeyOutcome, ScanAccumulator, TerminatorKeys};
pub use api::GateApi;
pub use config::{Role, ScannerConfig};
pub use error::{ApiError, GateError, ReasonError, Result, ScanError};
pub use guard::{GuardHandle, ProcessingGuard};
pub use keys::{FocusTarget, Key, KeyPress};
pub use notify::{Notifier, Severity, TracingNotifier};
pub use pipeline::{ScanOutcome, ScanPipeline, Submission};
pub use roster::{pending_cross_hostel, Roster, SharedRoster};
pub use session::ScannerSession;
pub use status::derive_status;

pub use gatepass_protocol::{
    Channel, Entry, EntryStatus, RecordEntryRequest, ScanPayload, StudentProfile, VerifiedSubject,
};
