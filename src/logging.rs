//! Structured JSONL logging plus human-readable stderr output.
//!
//! - **JSONL to file** (~/.filepane/logs/filepane.jsonl) for machine parsing
//! - **Pretty to stderr** for developers
//!
//! # Usage
//!
//! ```rust,ignore
//! use filepane::logging;
//!
//! // MUST keep guard alive for duration of program
//! let _guard = logging::init();
//!
//! tracing::info!(event_type = "app_start", "Application started");
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "filepane.jsonl";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    // Non-blocking writer so a slow disk never stalls the render loop
    let (non_blocking_file, file_guard) = match file {
        Ok(file) => tracing_appender::non_blocking(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            tracing_appender::non_blocking(std::io::sink())
        }
    };

    // Default to info, allow override via RUST_LOG
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    // try_init: a host that already installed a subscriber keeps it
    if tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .is_err()
    {
        eprintln!("[LOGGING] A global subscriber is already installed");
    }

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the log directory path (~/.filepane/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".filepane").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("filepane-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

// =============================================================================
// STRUCTURED LOGGING HELPERS
// =============================================================================

/// Log a performance metric; warns when over threshold
pub fn log_perf(operation: &str, duration_ms: u64, threshold_ms: u64) {
    if duration_ms > threshold_ms {
        tracing::warn!(
            event_type = "performance",
            operation = operation,
            duration_ms = duration_ms,
            threshold_ms = threshold_ms,
            is_slow = true,
            "Slow operation: {} took {}ms (threshold: {}ms)",
            operation,
            duration_ms,
            threshold_ms
        );
    } else {
        tracing::trace!(
            event_type = "performance",
            operation = operation,
            duration_ms = duration_ms,
            threshold_ms = threshold_ms,
            is_slow = false,
            "Operation {} completed in {}ms",
            operation,
            duration_ms
        );
    }
}

/// Log the visible window requested by the host for one frame
pub fn log_render_window(first_row: usize, last_row: usize, row_count: usize, rows_built: usize) {
    tracing::trace!(
        event_type = "render_window",
        first_row,
        last_row,
        row_count,
        rows_built,
        "Window [{}, {}) of {} rows",
        first_row,
        last_row,
        row_count
    );
}
