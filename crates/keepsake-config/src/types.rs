//! Configuration types.
//!
//! Every struct implements [`Default`] matching `defaults.toml`, so a bare
//! `[section]` header in TOML produces a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key-value substrate selection.
    pub storage: StorageSection,
    /// Recovery slot addressing.
    pub recovery: RecoverySection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// `"surrealkv"` (on disk) or `"memory"` (process lifetime only).
    pub backend: String,
    /// Directory of the on-disk store. Empty uses `<home>/data/kv`.
    pub path: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: "surrealkv".to_owned(),
            path: String::new(),
        }
    }
}

impl StorageSection {
    /// Resolve the on-disk store directory relative to the keepsake home.
    #[must_use]
    pub fn resolved_path(&self, keepsake_home: &Path) -> PathBuf {
        if self.path.is_empty() {
            keepsake_home.join("data").join("kv")
        } else {
            PathBuf::from(&self.path)
        }
    }
}

// ---------------------------------------------------------------------------
// RecoverySection
// ---------------------------------------------------------------------------

/// Where recovery props are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoverySection {
    /// Storage namespace.
    pub namespace: String,
    /// Key within the namespace.
    pub key: String,
    /// Optional scope id; empty means unscoped.
    pub scope: String,
}

impl Default for RecoverySection {
    fn default() -> Self {
        Self {
            namespace: "system:error-recovery".to_owned(),
            key: "recovery-props".to_owned(),
            scope: String::new(),
        }
    }
}

impl RecoverySection {
    /// The scope id, if one is configured.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        Some(self.scope.as_str()).filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["keepsake_storage=debug"]`).
    pub directives: Vec<String>,
    /// Where log lines go: `"stderr"`, `"stdout"`, or `"file"`.
    ///
    /// `stdout` carries slot values for `consume`/`show`, so pointing logs
    /// there mixes the two streams.
    pub target: String,
    /// Log directory for the `file` target. Empty uses `<home>/logs`.
    pub directory: String,
    /// Log file rotation for the `file` target: `"daily"`, `"hourly"`, or
    /// `"never"`.
    pub rotation: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            target: "stderr".to_owned(),
            directory: String::new(),
            rotation: "daily".to_owned(),
        }
    }
}

impl LoggingSection {
    /// Resolve the log directory relative to the keepsake home.
    #[must_use]
    pub fn resolved_directory(&self, keepsake_home: &Path) -> PathBuf {
        if self.directory.is_empty() {
            keepsake_home.join("logs")
        } else {
            PathBuf::from(&self.directory)
        }
    }
}
