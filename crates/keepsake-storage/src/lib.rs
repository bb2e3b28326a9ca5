//! Keepsake Storage: the key-value substrate recovery props live in.
//!
//! # Substrate ([`KvStore`])
//!
//! Raw bytes addressed by `(namespace, key)`. Besides plain reads and writes
//! the trait offers `take`, which hands a value to exactly one caller and
//! removes it in the same step.
//!
//! | Backend | Durability | Availability |
//! |---------|------------|--------------|
//! | [`MemoryKvStore`] | Process lifetime | Always |
//! | [`SurrealKvStore`] | On disk, survives restarts | **`kv`** feature (default) |
//!
//! Namespaces and keys must be non-empty and free of NUL bytes; see
//! [`validate_namespace`] and [`validate_key`].
//!
//! # Feature Flags
//!
//! - **`kv`** - `SurrealKV` persistent key-value store

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod kv;

pub use error::{StorageError, StorageResult};
pub use kv::{KvStore, MemoryKvStore, validate_key, validate_namespace};

#[cfg(feature = "kv")]
pub use kv::SurrealKvStore;
