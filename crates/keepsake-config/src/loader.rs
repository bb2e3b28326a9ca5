//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge the user file `<home>/config.toml`, or the explicit file when
//!    one was given
//! 3. Apply env var fallbacks for fields no file set
//! 4. Resolve `${VAR}` references
//! 5. Deserialize and validate
//! 6. Return `ResolvedConfig`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars, resolve_env_references};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Name of the per-user directory under the home directory.
const HOME_DIR_NAME: &str = ".keepsake";

/// Load the configuration with layered precedence.
///
/// `explicit_file` replaces the user layer when given; unlike the user file
/// it must exist. `home_override` is used as the keepsake home directory
/// itself, bypassing `~/.keepsake` and `KEEPSAKE_HOME`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is unreadable or malformed,
/// or if the final merged configuration fails validation.
pub fn load(
    explicit_file: Option<&Path>,
    home_override: Option<&Path>,
) -> ConfigResult<ResolvedConfig> {
    load_with_env(explicit_file, home_override, &collect_env_vars())
}

fn load_with_env(
    explicit_file: Option<&Path>,
    home_override: Option<&Path>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    // Loading runs before any log subscriber exists; problems the caller
    // should still see travel back in `warnings`.
    let mut warnings = Vec::new();
    let home = match home_override {
        Some(h) => h.to_path_buf(),
        None => keepsake_home(
            env_vars.get("KEEPSAKE_HOME").map(String::as_str),
            &mut warnings,
        )?,
    };

    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::Malformed {
            origin: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    let overlay = if let Some(path) = explicit_file {
        let value = try_load_file(path)?.ok_or_else(|| missing(path))?;
        Some((value, path.to_path_buf(), ConfigLayer::Explicit))
    } else {
        let path = home.join("config.toml");
        try_load_file(&path)?.map(|value| (value, path, ConfigLayer::User))
    };

    if let Some((value, path, layer)) = overlay {
        deep_merge_tracking(&mut merged, &value, "", &layer, &mut field_sources);
        info!(path = %path.display(), layer = %layer, "loaded config file");
        loaded_files.push(path.display().to_string());
    }

    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    resolve_env_references(&mut merged, env_vars);
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Malformed {
                origin: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
        home,
        warnings,
    })
}

/// Load a config from a specific file path (no layering, no env).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = try_load_file(path)?.ok_or_else(|| missing(path))?;
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Malformed {
            origin: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
///
/// A single read with no separate exists/metadata check.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            });
        },
    };

    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: MAX_CONFIG_FILE_SIZE,
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::Malformed {
        origin: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

fn missing(path: &Path) -> ConfigError {
    ConfigError::Unreadable {
        path: path.to_path_buf(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    }
}

/// Resolve the keepsake home directory.
///
/// `KEEPSAKE_HOME` wins when it names an existing directory; otherwise a
/// warning is recorded and `~/.keepsake` is used.
fn keepsake_home(env_home: Option<&str>, warnings: &mut Vec<String>) -> ConfigResult<PathBuf> {
    if let Some(raw) = env_home {
        match PathBuf::from(raw).canonicalize() {
            Ok(p) if p.is_dir() => return Ok(p),
            _ => warnings.push(format!(
                "KEEPSAKE_HOME={raw} is not an existing directory; falling back to ~/{HOME_DIR_NAME}"
            )),
        }
    }
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(HOME_DIR_NAME))
        .ok_or(ConfigError::NoHome)
}
