//! Errors raised by the key-value substrate.

use std::path::PathBuf;

/// A substrate operation failed.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The on-disk store could not be opened.
    #[error("cannot open store at {}: {reason}", path.display())]
    Open {
        /// Directory the store was opened at.
        path: PathBuf,
        /// Backend message.
        reason: String,
    },

    /// The backend rejected a read, write or commit.
    #[error("{op} failed: {reason}")]
    Backend {
        /// Operation that failed (`"get"`, `"take"`, ...).
        op: &'static str,
        /// Backend message.
        reason: String,
    },

    /// A namespace or key the substrate cannot address.
    #[error("invalid {part}: {reason}")]
    InvalidKey {
        /// `"namespace"` or `"key"`.
        part: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Result type for substrate operations.
pub type StorageResult<T> = Result<T, StorageError>;
