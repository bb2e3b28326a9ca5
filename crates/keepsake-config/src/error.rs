use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a keepsake configuration could not be assembled.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read, or an explicitly named one is missing.
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        /// File that was being read.
        path: PathBuf,
        /// I/O failure behind it.
        #[source]
        source: io::Error,
    },

    /// A config file is larger than keepsake is willing to parse.
    #[error("{} is {size} bytes; config files are capped at {limit}", path.display())]
    TooLarge {
        /// Offending file.
        path: PathBuf,
        /// Its size in bytes.
        size: u64,
        /// The cap.
        limit: u64,
    },

    /// A layer is not TOML, or does not fit the config schema.
    #[error("{origin} is not a usable keepsake config: {source}")]
    Malformed {
        /// File path, or a `<...>` label for the embedded and merged layers.
        origin: String,
        /// Parser or schema error.
        #[source]
        source: toml::de::Error,
    },

    /// A field holds a value keepsake cannot act on.
    #[error("{field}: {problem}")]
    Rejected {
        /// Dotted field path, e.g. `recovery.key`.
        field: &'static str,
        /// What is wrong with the value.
        problem: String,
    },

    /// Neither `KEEPSAKE_HOME` nor the user's home directory is usable.
    #[error("no keepsake home: KEEPSAKE_HOME is unusable and the user home directory is unknown")]
    NoHome,
}

/// Result of assembling or checking configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;
