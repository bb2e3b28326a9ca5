//! Logging setup failures.

use std::path::PathBuf;

use thiserror::Error;

/// Why the log subscriber could not be installed.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A level or directive did not parse.
    #[error("bad log filter '{directive}': {reason}")]
    Filter {
        /// The text that was rejected.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// The file sink's directory could not be created.
    #[error("cannot create log directory {}: {source}", path.display())]
    LogDirectory {
        /// Directory that was requested.
        path: PathBuf,
        /// I/O failure behind it.
        #[source]
        source: std::io::Error,
    },

    /// The appender or global subscriber could not be set up.
    #[error("cannot install log subscriber: {0}")]
    Install(String),
}

/// Result of logging setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
