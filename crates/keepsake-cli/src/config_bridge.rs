//! Bridge from `keepsake_config::Config` to storage, recovery and logging
//! types.

use std::sync::Arc;

use anyhow::{Context, Result};
use keepsake_config::{Config, ResolvedConfig};
use keepsake_recovery::{RecoveryResult, RecoverySlot};
use keepsake_storage::{KvStore, MemoryKvStore, SurrealKvStore};
use keepsake_telemetry::{FileRotation, LogConfig, LogFormat, LogSink};

/// Convert the `[logging]` section to a [`LogConfig`]. An empty log
/// directory means `<home>/logs`.
pub(crate) fn to_log_config(resolved: &ResolvedConfig) -> LogConfig {
    let logging = &resolved.config.logging;
    let sink = match logging.target.as_str() {
        "stdout" => LogSink::Stdout,
        "file" => LogSink::Files {
            directory: logging.resolved_directory(&resolved.home),
            rotation: FileRotation::from_name(&logging.rotation),
        },
        _ => LogSink::Stderr,
    };

    logging.directives.iter().fold(
        LogConfig::new(&logging.level)
            .with_format(LogFormat::from_name(&logging.format))
            .with_sink(sink),
        |log_config, directive| log_config.with_directive(directive),
    )
}

/// Build the recovery slot from the `[recovery]` section. `scope_override`
/// wins over the configured scope.
pub(crate) fn to_recovery_slot(
    cfg: &Config,
    scope_override: Option<&str>,
) -> RecoveryResult<RecoverySlot> {
    let slot = RecoverySlot::new(&cfg.recovery.namespace, &cfg.recovery.key)?;
    match scope_override.or(cfg.recovery.scope()) {
        Some(scope) => slot.with_scope(scope),
        None => Ok(slot),
    }
}

/// The opened key-value substrate.
pub(crate) enum Backend {
    /// Process-lifetime store.
    Memory(Arc<MemoryKvStore>),
    /// On-disk store.
    Disk(Arc<SurrealKvStore>),
}

impl Backend {
    /// Open the backend named in the `[storage]` section.
    pub(crate) fn open(resolved: &ResolvedConfig) -> Result<Self> {
        match resolved.config.storage.backend.as_str() {
            "memory" => {
                tracing::warn!("memory backend selected; values will not outlive this process");
                Ok(Self::Memory(Arc::new(MemoryKvStore::new())))
            },
            _ => {
                let path = resolved.storage_path();
                let store = SurrealKvStore::open(&path)
                    .with_context(|| format!("failed to open store at {}", path.display()))?;
                Ok(Self::Disk(Arc::new(store)))
            },
        }
    }

    /// The substrate as a trait object.
    pub(crate) fn kv(&self) -> Arc<dyn KvStore> {
        match self {
            Self::Memory(store) => Arc::clone(store) as Arc<dyn KvStore>,
            Self::Disk(store) => Arc::clone(store) as Arc<dyn KvStore>,
        }
    }

    /// Flush and close the backend.
    pub(crate) async fn close(&self) -> Result<()> {
        if let Self::Disk(store) = self {
            store.close().await.context("failed to close store")?;
        }
        Ok(())
    }
}
