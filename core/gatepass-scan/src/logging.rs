//! File logging for gatepass-scan.
//!
//! `listen` owns the terminal in raw mode, so logs go to a daily file under
//! `~/.gatepass/logs/` instead of stderr. `GATEPASS_DEBUG_LOG=1` forces debug
//! level; otherwise `RUST_LOG` applies, defaulting to info.

use fs_err as fs;
use std::env;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEBUG_ENV: &str = "GATEPASS_DEBUG_LOG";
const LOG_FILE_PREFIX: &str = "gatepass-scan.log";

/// Installs the global subscriber. Keep the returned guard alive for the
/// life of the process or buffered lines are lost.
pub fn init() -> Option<WorkerGuard> {
    let filter = env_filter();

    let log_dir = match gatepass_core::config::gatepass_dir() {
        Ok(dir) => dir.join("logs"),
        Err(_) => {
            init_stderr(filter);
            return None;
        }
    };

    if let Err(err) = fs::create_dir_all(&log_dir) {
        init_stderr(filter);
        tracing::warn!(error = %err, "Failed to create log directory; logging to stderr");
        return None;
    }

    let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Some(guard)
}

fn init_stderr(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn env_filter() -> EnvFilter {
    let debug_enabled = env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}
