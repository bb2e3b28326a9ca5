//! Single-slot recovery props store.

use std::sync::Arc;

use keepsake_storage::KvStore;
use tracing::{debug, warn};

use crate::error::RecoveryResult;
use crate::slot::RecoverySlot;

/// Durable, single-slot storage for one textual value with consume-once reads.
///
/// The substrate is injected at construction. Every operation is one
/// request-response against it; failures are logged and reported as
/// `false` / `None` rather than returned as errors.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use keepsake_recovery::{RecoveryPropsStore, RecoverySlot};
/// use keepsake_storage::MemoryKvStore;
///
/// let store = RecoveryPropsStore::new(Arc::new(MemoryKvStore::new()), RecoverySlot::default());
/// assert!(store.set_recovery_props("crash-report-v1").await);
/// assert_eq!(store.consume_recovery_props().await.as_deref(), Some("crash-report-v1"));
/// assert_eq!(store.consume_recovery_props().await, None);
/// ```
#[derive(Clone)]
pub struct RecoveryPropsStore {
    kv: Arc<dyn KvStore>,
    slot: RecoverySlot,
    key: String,
}

impl std::fmt::Debug for RecoveryPropsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryPropsStore")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl RecoveryPropsStore {
    /// Create a store for `slot` over the given substrate.
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>, slot: RecoverySlot) -> Self {
        let key = slot.storage_key();
        Self { kv, slot, key }
    }

    /// Create a store for `base` narrowed to one app's `scope_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError::InvalidSlot`](crate::RecoveryError::InvalidSlot) if the scope id is invalid.
    pub fn for_scope(
        store: Arc<dyn KvStore>,
        base: &RecoverySlot,
        scope_id: &str,
    ) -> RecoveryResult<Self> {
        Ok(Self::new(store, base.clone().with_scope(scope_id)?))
    }

    /// The slot this store reads and writes.
    #[must_use]
    pub fn slot(&self) -> &RecoverySlot {
        &self.slot
    }

    /// Write `props` into the slot, replacing any previous value.
    ///
    /// Returns `true` once the substrate acknowledged the write.
    pub async fn set_recovery_props(&self, props: &str) -> bool {
        match self.kv.set(self.slot.namespace(), &self.key, props.as_bytes().to_vec()).await {
            Ok(()) => {
                debug!(slot = %self.slot, bytes = props.len(), "stored recovery props");
                true
            },
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "failed to store recovery props");
                false
            },
        }
    }

    /// Read and clear the slot.
    ///
    /// Returns `None` if nothing was stored or the substrate failed.
    /// Stored bytes that are not UTF-8 are discarded: the slot is cleared
    /// and `None` is returned.
    pub async fn consume_recovery_props(&self) -> Option<String> {
        let bytes = match self.kv.take(self.slot.namespace(), &self.key).await {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "failed to consume recovery props");
                return None;
            },
        };
        debug!(slot = %self.slot, bytes = bytes.len(), "consumed recovery props");
        self.decode(bytes)
    }

    /// Read the slot without clearing it.
    pub async fn peek_recovery_props(&self) -> Option<String> {
        match self.kv.get(self.slot.namespace(), &self.key).await {
            Ok(bytes) => bytes.and_then(|b| self.decode(b)),
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "failed to read recovery props");
                None
            },
        }
    }

    /// Remove the slot's value without reading it.
    ///
    /// Returns `true` if the substrate acknowledged the removal, whether or
    /// not a value was present.
    pub async fn clear_recovery_props(&self) -> bool {
        match self.kv.delete(self.slot.namespace(), &self.key).await {
            Ok(existed) => {
                debug!(slot = %self.slot, existed, "cleared recovery props");
                true
            },
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "failed to clear recovery props");
                false
            },
        }
    }

    /// Scope ids that currently hold a value under this slot's base key.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError::Storage`](crate::RecoveryError::Storage) if listing fails.
    pub async fn list_scopes(&self) -> RecoveryResult<Vec<String>> {
        let mut scopes: Vec<String> = self
            .kv
            .list_keys(self.slot.namespace())
            .await?
            .iter()
            .filter_map(|k| self.slot.scope_of(k).map(str::to_owned))
            .collect();
        scopes.sort();
        Ok(scopes)
    }

    /// Remove every value in the slot's namespace, scoped or not.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError::Storage`](crate::RecoveryError::Storage) if the clear fails.
    pub async fn clear_namespace(&self) -> RecoveryResult<u64> {
        let removed = self.kv.clear_namespace(self.slot.namespace()).await?;
        debug!(namespace = self.slot.namespace(), removed, "cleared recovery namespace");
        Ok(removed)
    }

    fn decode(&self, bytes: Vec<u8>) -> Option<String> {
        match String::from_utf8(bytes) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "discarding non-UTF-8 recovery props");
                None
            },
        }
    }
}
