//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Accepted `storage.backend` values.
pub const STORAGE_BACKENDS: &[&str] = &["surrealkv", "memory"];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];
const LOG_TARGETS: &[&str] = &["stderr", "stdout", "file"];
const LOG_ROTATIONS: &[&str] = &["daily", "hourly", "never"];

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns [`ConfigError::Rejected`] for the first field found unusable.
pub fn validate(config: &Config) -> ConfigResult<()> {
    one_of("storage.backend", &config.storage.backend, STORAGE_BACKENDS)?;

    let r = &config.recovery;
    slot_part("recovery.namespace", &r.namespace, false)?;
    slot_part("recovery.key", &r.key, false)?;
    slot_part("recovery.scope", &r.scope, true)?;

    let l = &config.logging;
    one_of("logging.level", &l.level, LOG_LEVELS)?;
    one_of("logging.format", &l.format, LOG_FORMATS)?;
    one_of("logging.target", &l.target, LOG_TARGETS)?;
    one_of("logging.rotation", &l.rotation, LOG_ROTATIONS)
}

fn one_of(field: &'static str, value: &str, allowed: &[&str]) -> ConfigResult<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::Rejected {
        field,
        problem: format!("'{value}' is not one of {}", allowed.join(", ")),
    })
}

// Same rules as keepsake_storage::validate_key.
fn slot_part(field: &'static str, value: &str, may_be_empty: bool) -> ConfigResult<()> {
    let problem = if value.is_empty() && !may_be_empty {
        "must not be empty"
    } else if value.contains('\0') {
        "must not contain NUL bytes"
    } else {
        return Ok(());
    };
    Err(ConfigError::Rejected {
        field,
        problem: problem.to_owned(),
    })
}
