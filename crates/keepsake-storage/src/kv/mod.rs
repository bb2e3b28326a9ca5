//! The [`KvStore`] trait and its backends.
//!
//! Values are raw bytes addressed by `(namespace, key)`. Recovery props live
//! under `system:error-recovery` by default; anything else sharing the
//! substrate uses its own namespace and never sees them.

mod memory;
#[cfg(feature = "kv")]
mod surreal;

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};

pub use memory::MemoryKvStore;
#[cfg(feature = "kv")]
pub use surreal::SurrealKvStore;

/// Check that `namespace` can address a region of the substrate.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] if it is empty or contains a NUL
/// byte, which the on-disk encoding reserves as separator.
pub fn validate_namespace(namespace: &str) -> StorageResult<()> {
    check_part("namespace", namespace)
}

/// Check that `key` can address a value within a namespace.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] if it is empty or contains a NUL
/// byte.
pub fn validate_key(key: &str) -> StorageResult<()> {
    check_part("key", key)
}

fn check_part(part: &'static str, value: &str) -> StorageResult<()> {
    let reason = if value.is_empty() {
        "must not be empty"
    } else if value.contains('\0') {
        "must not contain NUL bytes"
    } else {
        return Ok(());
    };
    Err(StorageError::InvalidKey { part, reason })
}

/// Durable (or not) byte storage keyed by namespace and key.
///
/// Every call is a single request-response; implementations hold no state
/// between calls that a caller could observe half-applied.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a value.
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Write a value, replacing whatever was there.
    ///
    /// Returns once the backend has acknowledged the write.
    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()>;

    /// Remove a value. Returns whether one was present.
    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<bool>;

    /// Remove a value and return it, as one step.
    ///
    /// Of any number of concurrent `take`s on the same key, at most one
    /// receives the value.
    async fn take(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Keys currently holding a value in `namespace`, in no particular order.
    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>>;

    /// Remove every value in `namespace`. Returns how many were removed.
    async fn clear_namespace(&self, namespace: &str) -> StorageResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_slot_names_are_valid() {
        assert!(validate_namespace("system:error-recovery").is_ok());
        assert!(validate_key("recovery-props:@acme/app").is_ok());
    }

    #[test]
    fn test_empty_parts_rejected() {
        let err = validate_namespace("").unwrap_err();
        assert_eq!(err.to_string(), "invalid namespace: must not be empty");
        assert!(validate_key("").is_err());
    }

    #[test]
    fn test_nul_rejected() {
        let err = validate_key("recovery\0props").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey { part: "key", .. }));
        assert!(validate_namespace("system\0").is_err());
    }
}
