//! JSON convenience layer over [`RecoveryPropsStore`].
//!
//! On startup an app calls [`ErrorRecovery::initialize`], which consumes
//! whatever the previous run saved and parses it as a JSON object. During
//! the run the app keeps the props it would want back after a crash with
//! [`ErrorRecovery::set_recovery_props`]; these are held in memory only.
//! The app's own fault handler calls [`ErrorRecovery::save_pending`] to
//! persist them.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{RecoveryError, RecoveryResult};
use crate::store::RecoveryPropsStore;

/// Recovered and pending recovery props for one app run.
#[derive(Debug)]
pub struct ErrorRecovery {
    store: RecoveryPropsStore,
    recovered: Option<Map<String, Value>>,
    pending: Mutex<Option<String>>,
}

impl ErrorRecovery {
    /// Consume the props saved by the previous run and parse them.
    ///
    /// Text that is not a JSON object is logged and dropped; it has already
    /// been cleared from the store either way.
    pub async fn initialize(store: RecoveryPropsStore) -> Self {
        let recovered = store
            .consume_recovery_props()
            .await
            .and_then(|raw| parse_props(&raw));
        if recovered.is_some() {
            debug!(slot = %store.slot(), "recovered props from previous run");
        }
        Self {
            store,
            recovered,
            pending: Mutex::new(None),
        }
    }

    /// Props saved by the previous run, if any.
    #[must_use]
    pub fn recovered_props(&self) -> Option<&Map<String, Value>> {
        self.recovered.as_ref()
    }

    /// Replace the pending props with `props`, serialized as JSON.
    ///
    /// Nothing is written to the store until [`save_pending`](Self::save_pending).
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError::Serialization`] if `props` cannot be
    /// serialized or does not serialize to a JSON object.
    pub fn set_recovery_props<T: Serialize + ?Sized>(&self, props: &T) -> RecoveryResult<()> {
        let value =
            serde_json::to_value(props).map_err(|e| RecoveryError::Serialization(e.to_string()))?;
        if !value.is_object() {
            return Err(RecoveryError::Serialization(
                "recovery props must serialize to a JSON object".into(),
            ));
        }
        let json = value.to_string();
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        Ok(())
    }

    /// The pending JSON text, if any has been set.
    #[must_use]
    pub fn pending(&self) -> Option<String> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Persist the pending props for the next run.
    ///
    /// With nothing pending, nothing is written and `true` is returned.
    pub async fn save_pending(&self) -> bool {
        match self.pending() {
            Some(json) => self.store.set_recovery_props(&json).await,
            None => true,
        }
    }

    /// The underlying single-slot store.
    #[must_use]
    pub fn store(&self) -> &RecoveryPropsStore {
        &self.store
    }
}

fn parse_props(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            warn!(kind = json_kind(&other), "recovered props are not a JSON object; ignoring");
            None
        },
        Err(e) => {
            warn!(error = %e, "recovered props are not valid JSON; ignoring");
            None
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use keepsake_storage::MemoryKvStore;
    use serde_json::json;

    use super::*;
    use crate::slot::RecoverySlot;

    fn memory_store() -> RecoveryPropsStore {
        RecoveryPropsStore::new(Arc::new(MemoryKvStore::new()), RecoverySlot::default())
    }

    #[tokio::test]
    async fn test_fresh_start_has_nothing_recovered() {
        let recovery = ErrorRecovery::initialize(memory_store()).await;
        assert!(recovery.recovered_props().is_none());
        assert!(recovery.pending().is_none());
    }

    #[tokio::test]
    async fn test_set_does_not_write_until_saved() {
        let store = memory_store();
        let recovery = ErrorRecovery::initialize(store.clone()).await;
        recovery
            .set_recovery_props(&json!({ "screen": "checkout" }))
            .unwrap();
        assert!(store.peek_recovery_props().await.is_none());

        assert!(recovery.save_pending().await);
        assert_eq!(
            store.peek_recovery_props().await.as_deref(),
            Some(r#"{"screen":"checkout"}"#)
        );
    }

    #[tokio::test]
    async fn test_save_with_nothing_pending_writes_nothing() {
        let store = memory_store();
        let recovery = ErrorRecovery::initialize(store.clone()).await;
        assert!(recovery.save_pending().await);
        assert!(store.peek_recovery_props().await.is_none());
    }

    #[tokio::test]
    async fn test_rejects_non_object_props() {
        let recovery = ErrorRecovery::initialize(memory_store()).await;
        assert!(matches!(
            recovery.set_recovery_props(&[1, 2, 3]),
            Err(RecoveryError::Serialization(_))
        ));
        assert!(recovery.pending().is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_is_dropped_and_cleared() {
        let store = memory_store();
        store.set_recovery_props("not json").await;
        let recovery = ErrorRecovery::initialize(store.clone()).await;
        assert!(recovery.recovered_props().is_none());
        assert!(store.peek_recovery_props().await.is_none());
    }

    #[test]
    fn test_parse_props_requires_object() {
        assert!(parse_props(r#"{"a":1}"#).is_some());
        assert!(parse_props("\"text\"").is_none());
        assert!(parse_props("null").is_none());
        assert!(parse_props("{").is_none());
    }
}
