//! Storage slot addressing.

use std::fmt;

use keepsake_storage::{validate_key, validate_namespace};

use crate::error::{RecoveryError, RecoveryResult};

/// Default namespace for recovery props.
pub const DEFAULT_NAMESPACE: &str = "system:error-recovery";

/// Default key for recovery props within [`DEFAULT_NAMESPACE`].
pub const DEFAULT_KEY: &str = "recovery-props";

/// Separator between the base key and a scope id.
const SCOPE_SEPARATOR: char = ':';

/// The `(namespace, key)` pair a recovery store reads and writes.
///
/// An optional scope id gives each hosted app its own slot under the same
/// base key; the stored key is then `"{key}:{scope}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverySlot {
    namespace: String,
    key: String,
    scope: Option<String>,
}

impl RecoverySlot {
    /// Create an unscoped slot.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError::InvalidSlot`] if the namespace or key is
    /// empty or contains null bytes.
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> RecoveryResult<Self> {
        let namespace = namespace.into();
        let key = key.into();
        validate_namespace(&namespace).map_err(|e| RecoveryError::InvalidSlot(e.to_string()))?;
        validate_key(&key).map_err(|e| RecoveryError::InvalidSlot(e.to_string()))?;
        Ok(Self {
            namespace,
            key,
            scope: None,
        })
    }

    /// Bind this slot to a scope id, replacing any previous scope.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError::InvalidSlot`] if the scope id is empty or
    /// contains null bytes.
    pub fn with_scope(mut self, scope: impl Into<String>) -> RecoveryResult<Self> {
        let scope = scope.into();
        validate_key(&scope).map_err(|e| RecoveryError::InvalidSlot(format!("scope: {e}")))?;
        self.scope = Some(scope);
        Ok(self)
    }

    /// The namespace holding the slot.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The base key, without any scope.
    #[must_use]
    pub fn base_key(&self) -> &str {
        &self.key
    }

    /// The scope id, if this slot is scoped.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// The key actually written to the store.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{}{SCOPE_SEPARATOR}{scope}", self.key),
            None => self.key.clone(),
        }
    }

    /// Extract the scope id from a stored key belonging to this slot's base key.
    pub(crate) fn scope_of<'a>(&self, stored_key: &'a str) -> Option<&'a str> {
        stored_key
            .strip_prefix(self.key.as_str())?
            .strip_prefix(SCOPE_SEPARATOR)
            .filter(|s| !s.is_empty())
    }
}

impl Default for RecoverySlot {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            key: DEFAULT_KEY.to_owned(),
            scope: None,
        }
    }
}

impl fmt::Display for RecoverySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.storage_key())
    }
}
