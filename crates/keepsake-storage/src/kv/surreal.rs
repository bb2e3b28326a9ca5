//! On-disk backend over a `SurrealKV` tree.
//!
//! A value lives at the byte key `namespace ++ 0x00 ++ key`. All keys of a
//! namespace therefore sort inside `[namespace ++ 0x00, namespace ++ 0x01)`,
//! which is the range `list_keys` and `clear_namespace` scan.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use surrealkv::{Mode, Tree, TreeBuilder};
use tracing::debug;

use super::{KvStore, validate_key, validate_namespace};
use crate::error::{StorageError, StorageResult};

/// Persistent [`KvStore`]; values survive process restarts.
///
/// Each call runs in its own transaction, dropped on every return path. A
/// `take` reads and deletes in one read-write transaction: when two takes
/// race, one commit conflicts and that caller gets an error instead of the
/// value.
pub struct SurrealKvStore {
    tree: Tree,
    path: PathBuf,
}

impl std::fmt::Debug for SurrealKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealKvStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn failed(op: &'static str) -> impl Fn(surrealkv::Error) -> StorageError {
    move |e| StorageError::Backend {
        op,
        reason: e.to_string(),
    }
}

fn encode(namespace: &str, key: &str) -> StorageResult<Vec<u8>> {
    validate_namespace(namespace)?;
    validate_key(key)?;
    Ok([namespace.as_bytes(), &[0u8][..], key.as_bytes()].concat())
}

fn namespace_bounds(namespace: &str) -> StorageResult<(Vec<u8>, Vec<u8>)> {
    validate_namespace(namespace)?;
    Ok((
        [namespace.as_bytes(), &[0u8][..]].concat(),
        [namespace.as_bytes(), &[1u8][..]].concat(),
    ))
}

impl SurrealKvStore {
    /// Open (or create) the store in directory `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the directory cannot be created or
    /// the tree cannot be opened, e.g. because another process holds it.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |reason: String| StorageError::Open {
            path: path.clone(),
            reason,
        };
        std::fs::create_dir_all(&path).map_err(|e| open_err(e.to_string()))?;
        let tree = TreeBuilder::new()
            .with_path(path.clone())
            .build()
            .map_err(|e| open_err(e.to_string()))?;
        debug!(path = %path.display(), "opened recovery store");
        Ok(Self { tree, path })
    }

    /// Directory the store lives in.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush pending writes and release the tree.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the flush fails.
    pub async fn close(&self) -> StorageResult<()> {
        self.tree.close().await.map_err(failed("close"))?;
        debug!(path = %self.path.display(), "closed recovery store");
        Ok(())
    }
}

#[async_trait]
impl KvStore for SurrealKvStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let raw = encode(namespace, key)?;
        let tx = self
            .tree
            .begin_with_mode(Mode::ReadOnly)
            .map_err(failed("get"))?;
        tx.get(&raw).map_err(failed("get"))
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        let raw = encode(namespace, key)?;
        let mut tx = self.tree.begin().map_err(failed("set"))?;
        tx.set(&raw, &value).map_err(failed("set"))?;
        tx.commit().await.map_err(failed("set"))
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        Ok(self.take(namespace, key).await?.is_some())
    }

    async fn take(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let raw = encode(namespace, key)?;
        let mut tx = self.tree.begin().map_err(failed("take"))?;
        let Some(value) = tx.get(&raw).map_err(failed("take"))? else {
            return Ok(None);
        };
        tx.delete(&raw).map_err(failed("take"))?;
        tx.commit().await.map_err(failed("take"))?;
        Ok(Some(value))
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        let (start, end) = namespace_bounds(namespace)?;
        let tx = self
            .tree
            .begin_with_mode(Mode::ReadOnly)
            .map_err(failed("list_keys"))?;
        let mut iter = tx.range(&start, &end).map_err(failed("list_keys"))?;
        iter.seek_first().map_err(failed("list_keys"))?;

        let mut keys = Vec::new();
        while iter.valid() {
            let raw = iter.key();
            if let Some(Ok(key)) = raw.get(start.len()..).map(std::str::from_utf8) {
                keys.push(key.to_owned());
            }
            iter.next().map_err(failed("list_keys"))?;
        }
        Ok(keys)
    }

    async fn clear_namespace(&self, namespace: &str) -> StorageResult<u64> {
        let (start, end) = namespace_bounds(namespace)?;
        let mut tx = self.tree.begin().map_err(failed("clear_namespace"))?;

        let doomed = {
            let mut iter = tx.range(&start, &end).map_err(failed("clear_namespace"))?;
            iter.seek_first().map_err(failed("clear_namespace"))?;
            let mut doomed = Vec::new();
            while iter.valid() {
                doomed.push(iter.key());
                iter.next().map_err(failed("clear_namespace"))?;
            }
            doomed
        };

        if doomed.is_empty() {
            return Ok(0);
        }
        for raw in &doomed {
            tx.delete(raw).map_err(failed("clear_namespace"))?;
        }
        tx.commit().await.map_err(failed("clear_namespace"))?;
        Ok(u64::try_from(doomed.len()).unwrap_or(u64::MAX))
    }
}
