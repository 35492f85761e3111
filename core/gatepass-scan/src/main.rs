//! gatepass-scan: gate terminal for keyboard-wedge QR scanners.
//!
//! ## Subcommands
//!
//! - `listen`: Turns this terminal into the scanner input. Scans ending in the
//!   check-in key record a check-in, scans ending in the check-out key record
//!   a check-out. Ctrl+C exits.
//! - `pending`: Lists check-ins from other hostels still missing a reason
//! - `reason`: Attaches a cross-hostel reason to an entry

mod http_api;
mod listen;
mod logging;
mod pending;
mod terminal;

use clap::{Parser, Subcommand};
use gatepass_core::{GateApi, ScannerConfig};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "gatepass-scan")]
#[command(about = "Hostel gate QR scanner terminal")]
#[command(version)]
struct Cli {
    /// Scanner config file (default: ~/.gatepass/scanner.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read scanner input from this terminal
    Listen,

    /// List cross-hostel check-ins awaiting a reason
    Pending,

    /// Attach a reason to a cross-hostel entry
    Reason {
        /// Entry id as shown by `pending`
        #[arg(value_name = "ENTRY_ID")]
        entry_id: String,

        /// Why the student is entering another hostel
        #[arg(value_name = "REASON")]
        reason: String,
    },
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    let config = match ScannerConfig::load(cli.config) {
        Ok(config) => config,
        Err(err) => fail("Failed to load scanner config", &err.to_string()),
    };

    let api: Arc<dyn GateApi> = match http_api::HttpGateApi::new(&config) {
        Ok(api) => Arc::new(api),
        Err(err) => fail("Failed to build backend client", &err),
    };

    let result = match cli.command {
        Commands::Listen => listen::run(&config, api).map_err(CommandError::Failed),
        Commands::Pending => pending::run_pending(&config, api),
        Commands::Reason { entry_id, reason } => {
            pending::run_reason(&config, api, &entry_id, &reason)
        }
    };

    match result {
        Ok(()) => {}
        Err(CommandError::Reported) => std::process::exit(1),
        Err(CommandError::Failed(err)) => fail("gatepass-scan failed", &err),
    }
}

/// Subcommand failure. `Reported` errors were already shown to the operator
/// by the notifier.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CommandError {
    Reported,
    Failed(String),
}

fn fail(context: &str, err: &str) -> ! {
    tracing::error!(error = %err, "{}", context);
    eprintln!("{}: {}", context, err);
    std::process::exit(1);
}
