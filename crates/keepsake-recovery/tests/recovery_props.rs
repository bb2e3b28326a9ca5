//! Integration tests for recovery props across substrates and restarts.

use std::sync::Arc;

use async_trait::async_trait;
use keepsake_recovery::{ErrorRecovery, RecoveryPropsStore, RecoverySlot};
use keepsake_storage::{KvStore, MemoryKvStore, StorageError, StorageResult, SurrealKvStore};
use serde_json::json;

/// Substrate that rejects every operation.
struct BrokenKvStore;

fn broken() -> StorageError {
    StorageError::Backend {
        op: "kv",
        reason: "disk unavailable".into(),
    }
}

#[async_trait]
impl KvStore for BrokenKvStore {
    async fn get(&self, _: &str, _: &str) -> StorageResult<Option<Vec<u8>>> {
        Err(broken())
    }
    async fn set(&self, _: &str, _: &str, _: Vec<u8>) -> StorageResult<()> {
        Err(broken())
    }
    async fn delete(&self, _: &str, _: &str) -> StorageResult<bool> {
        Err(broken())
    }
    async fn take(&self, _: &str, _: &str) -> StorageResult<Option<Vec<u8>>> {
        Err(broken())
    }
    async fn list_keys(&self, _: &str) -> StorageResult<Vec<String>> {
        Err(broken())
    }
    async fn clear_namespace(&self, _: &str) -> StorageResult<u64> {
        Err(broken())
    }
}

fn open_disk_store(dir: &tempfile::TempDir) -> Arc<SurrealKvStore> {
    Arc::new(SurrealKvStore::open(dir.path().join("kv")).unwrap())
}

#[tokio::test]
async fn test_failing_substrate_reports_false_and_absent() {
    let store = RecoveryPropsStore::new(Arc::new(BrokenKvStore), RecoverySlot::default());

    assert!(!store.set_recovery_props("crash-report-v1").await);
    assert!(store.consume_recovery_props().await.is_none());
    assert!(store.peek_recovery_props().await.is_none());
    assert!(!store.clear_recovery_props().await);
    assert!(store.list_scopes().await.is_err());
}

#[tokio::test]
async fn test_scopes_are_isolated() {
    let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
    let base = RecoverySlot::default();
    let a = RecoveryPropsStore::for_scope(Arc::clone(&kv), &base, "app-a").unwrap();
    let b = RecoveryPropsStore::for_scope(Arc::clone(&kv), &base, "app-b").unwrap();

    assert!(a.set_recovery_props("from-a").await);
    assert!(b.consume_recovery_props().await.is_none());
    assert_eq!(a.consume_recovery_props().await.as_deref(), Some("from-a"));
}

#[tokio::test]
async fn test_custom_slot_does_not_collide_with_default() {
    let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
    let default = RecoveryPropsStore::new(Arc::clone(&kv), RecoverySlot::default());
    let custom = RecoveryPropsStore::new(
        Arc::clone(&kv),
        RecoverySlot::new("app:diagnostics", "last-crash").unwrap(),
    );

    default.set_recovery_props("d").await;
    custom.set_recovery_props("c").await;
    assert_eq!(custom.consume_recovery_props().await.as_deref(), Some("c"));
    assert_eq!(default.consume_recovery_props().await.as_deref(), Some("d"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consumers_get_value_once() {
    let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
    let store = RecoveryPropsStore::new(kv, RecoverySlot::default());
    assert!(store.set_recovery_props("only-once").await);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.consume_recovery_props().await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if let Some(props) = handle.await.unwrap() {
            assert_eq!(props, "only-once");
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_props_survive_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    {
        let disk = open_disk_store(&dir);
        let store = RecoveryPropsStore::new(Arc::clone(&disk) as Arc<dyn KvStore>, RecoverySlot::default());
        assert!(store.set_recovery_props("crash-report-v1").await);
        disk.close().await.unwrap();
    }

    let store = RecoveryPropsStore::new(open_disk_store(&dir), RecoverySlot::default());
    assert_eq!(
        store.consume_recovery_props().await.as_deref(),
        Some("crash-report-v1")
    );
    assert!(store.consume_recovery_props().await.is_none());
}

#[tokio::test]
async fn test_error_recovery_across_runs() {
    let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
    let slot = RecoverySlot::default();

    // First run: nothing to recover, app records state and crashes.
    let store = RecoveryPropsStore::new(Arc::clone(&kv), slot.clone());
    let first = ErrorRecovery::initialize(store).await;
    assert!(first.recovered_props().is_none());
    first
        .set_recovery_props(&json!({ "route": "/cart", "items": 3 }))
        .unwrap();
    assert!(first.save_pending().await);

    // Second run gets the props back.
    let store = RecoveryPropsStore::new(Arc::clone(&kv), slot.clone());
    let second = ErrorRecovery::initialize(store).await;
    let recovered = second.recovered_props().unwrap();
    assert_eq!(recovered["route"], "/cart");
    assert_eq!(recovered["items"], 3);

    // Third run: already consumed.
    let store = RecoveryPropsStore::new(kv, slot);
    let third = ErrorRecovery::initialize(store).await;
    assert!(third.recovered_props().is_none());
}
