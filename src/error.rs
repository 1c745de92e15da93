use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

/// Error severity for host-side display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // informational, nothing to surface
    Warning,  // recoverable, fallback shown
    Error,    // operation failed
}

/// Domain-specific errors for the file pane
#[derive(Error, Debug)]
pub enum FilePaneError {
    #[error("Failed to decode image '{path}': {source}")]
    ThumbnailDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write thumbnail '{path}': {message}")]
    ThumbnailWrite { path: PathBuf, message: String },

    #[error("Thumbnail cache directory unavailable: {0}")]
    CacheDir(String),

    #[error("Thumbnail generator panicked on '{path}': {message}")]
    GeneratorPanic { path: PathBuf, message: String },

    #[error("Thumbnail worker pool error: {0}")]
    WorkerPool(String),
}

impl FilePaneError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // A failed thumbnail leaves the type icon in place; nothing to show.
            Self::ThumbnailDecode { .. } => ErrorSeverity::Info,
            Self::ThumbnailWrite { .. } => ErrorSeverity::Warning,
            Self::CacheDir(_) => ErrorSeverity::Warning,
            Self::GeneratorPanic { .. } => ErrorSeverity::Warning,
            Self::WorkerPool(_) => ErrorSeverity::Error,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::ThumbnailDecode { path, .. } => {
                format!("Could not read image {}", path.display())
            }
            Self::ThumbnailWrite { path, .. } => {
                format!("Could not save preview for {}", path.display())
            }
            Self::CacheDir(msg) => format!("Preview cache unavailable: {}", msg),
            Self::GeneratorPanic { path, .. } => {
                format!("Preview generation crashed on {}", path.display())
            }
            Self::WorkerPool(msg) => format!("Preview generation stopped: {}", msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, FilePaneError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use filepane::error::ResultExt;
///
/// // Keep going if the effective config can't be written
/// config.save_to(&path).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

/// Panic in debug mode, log error in release mode.
///
/// Use for "impossible" states that should crash during development
/// but degrade in production.
///
/// ```ignore
/// debug_panic!("Completion for {} arrived with no pending entry", path.display());
/// ```
#[macro_export]
macro_rules! debug_panic {
    ( $($fmt_arg:tt)* ) => {
        if cfg!(debug_assertions) {
            panic!( $($fmt_arg)* );
        } else {
            tracing::error!("IMPOSSIBLE STATE: {}", format_args!($($fmt_arg)*));
        }
    };
}
