//! Recovery error types.

use keepsake_storage::StorageError;

/// Errors from recovery-props construction and the JSON layer.
///
/// The accessor operations themselves never return these; they report
/// substrate failures as `false` / `None`.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    /// The underlying store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Props could not be serialized, or were not a JSON object.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The slot namespace, key or scope is invalid.
    #[error("invalid slot: {0}")]
    InvalidSlot(String),
}

/// Result type for recovery operations.
pub type RecoveryResult<T> = Result<T, RecoveryError>;
