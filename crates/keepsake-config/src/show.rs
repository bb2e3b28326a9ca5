//! Source-annotated display for `keepsake config`.

use std::fmt::{self, Write as _};
use std::path::PathBuf;

use crate::merge::FieldSources;
use crate::types::Config;

/// A resolved configuration together with source annotations.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path → which layer set the value.
    pub field_sources: FieldSources,
    /// Config file paths that were loaded.
    pub loaded_files: Vec<String>,
    /// The keepsake home directory the config was resolved against.
    pub home: PathBuf,
    /// Problems noticed while loading that did not stop it. Loading happens
    /// before logging is set up, so the caller reports these.
    pub warnings: Vec<String>,
}

impl ResolvedConfig {
    /// Directory of the on-disk store.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.config.storage.resolved_path(&self.home)
    }

    /// Format the resolved config as TOML, each field annotated with the
    /// layer that set it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn show_toml(&self) -> Result<String, fmt::Error> {
        let toml_str = toml::to_string_pretty(&self.config).map_err(|_| fmt::Error)?;

        let mut output = String::new();
        output.push_str("# Resolved Keepsake configuration\n");
        let _ = writeln!(output, "# Home: {}", self.home.display());
        if self.loaded_files.is_empty() {
            output.push_str("# No config files loaded\n");
        } else {
            for path in &self.loaded_files {
                let _ = writeln!(output, "# Loaded: {path}");
            }
        }
        output.push('\n');

        let mut section = String::new();
        for line in toml_str.lines() {
            let trimmed = line.trim();
            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                name.clone_into(&mut section);
            }
            match self.annotation(&section, trimmed) {
                Some(layer) => writeln!(output, "{line}  # [{layer}]")?,
                None => writeln!(output, "{line}")?,
            }
        }

        Ok(output)
    }

    fn annotation(&self, section: &str, line: &str) -> Option<String> {
        let (field, _) = line.split_once('=')?;
        let path = format!("{section}.{}", field.trim());
        self.field_sources.get(&path).map(ToString::to_string)
    }
}
