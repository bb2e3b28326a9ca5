//! Process-lifetime backend.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::KvStore;
use crate::error::{StorageError, StorageResult};

type Namespaces = HashMap<String, HashMap<String, Vec<u8>>>;

/// In-memory [`KvStore`]. Values vanish with the process.
///
/// Every mutation, `take` included, happens under one write guard, so
/// consumers racing on a key are serialized.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    namespaces: RwLock<Namespaces>,
}

impl MemoryKvStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, op: &'static str) -> StorageResult<RwLockReadGuard<'_, Namespaces>> {
        self.namespaces.read().map_err(|_| poisoned(op))
    }

    fn write(&self, op: &'static str) -> StorageResult<RwLockWriteGuard<'_, Namespaces>> {
        self.namespaces.write().map_err(|_| poisoned(op))
    }
}

fn poisoned(op: &'static str) -> StorageError {
    StorageError::Backend {
        op,
        reason: "lock poisoned".into(),
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let namespaces = self.read("get")?;
        Ok(namespaces
            .get(namespace)
            .and_then(|values| values.get(key))
            .cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        self.write("set")?
            .entry(namespace.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        Ok(self.take(namespace, key).await?.is_some())
    }

    async fn take(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let mut namespaces = self.write("take")?;
        let Some(values) = namespaces.get_mut(namespace) else {
            return Ok(None);
        };
        let taken = values.remove(key);
        if values.is_empty() {
            namespaces.remove(namespace);
        }
        Ok(taken)
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        let namespaces = self.read("list_keys")?;
        Ok(namespaces
            .get(namespace)
            .map(|values| values.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn clear_namespace(&self, namespace: &str) -> StorageResult<u64> {
        let removed = self
            .write("clear_namespace")?
            .remove(namespace)
            .map_or(0, |values| values.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const NS: &str = "system:error-recovery";

    #[tokio::test]
    async fn test_take_hands_out_value_once() {
        let store = MemoryKvStore::new();
        store.set(NS, "recovery-props", b"crash".to_vec()).await.unwrap();

        assert_eq!(
            store.take(NS, "recovery-props").await.unwrap(),
            Some(b"crash".to_vec())
        );
        assert_eq!(store.take(NS, "recovery-props").await.unwrap(), None);
        assert_eq!(store.get(NS, "recovery-props").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_value_is_still_a_value() {
        let store = MemoryKvStore::new();
        store.set(NS, "recovery-props", Vec::new()).await.unwrap();
        assert_eq!(store.take(NS, "recovery-props").await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = MemoryKvStore::new();
        assert!(!store.delete(NS, "recovery-props").await.unwrap());
        store.set(NS, "recovery-props", b"x".to_vec()).await.unwrap();
        assert!(store.delete(NS, "recovery-props").await.unwrap());
    }

    #[tokio::test]
    async fn test_namespaces_do_not_share_keys() {
        let store = MemoryKvStore::new();
        store.set(NS, "recovery-props", b"ours".to_vec()).await.unwrap();
        store.set("app:cache", "recovery-props", b"theirs".to_vec()).await.unwrap();

        assert_eq!(store.clear_namespace(NS).await.unwrap(), 1);
        assert_eq!(
            store.get("app:cache", "recovery-props").await.unwrap(),
            Some(b"theirs".to_vec())
        );
        assert!(store.list_keys(NS).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_keys_covers_scoped_slots() {
        let store = MemoryKvStore::new();
        for key in ["recovery-props", "recovery-props:a", "recovery-props:b"] {
            store.set(NS, key, b"v".to_vec()).await.unwrap();
        }
        let mut keys = store.list_keys(NS).await.unwrap();
        keys.sort();
        assert_eq!(keys, ["recovery-props", "recovery-props:a", "recovery-props:b"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_takes_have_one_winner() {
        let store = Arc::new(MemoryKvStore::new());
        store.set(NS, "recovery-props", b"once".to_vec()).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.take(NS, "recovery-props").await.unwrap() })
            })
            .collect();

        let mut winners = 0_usize;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners = winners.saturating_add(1);
            }
        }
        assert_eq!(winners, 1);
    }
}
