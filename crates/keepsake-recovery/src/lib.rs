//! Keepsake Recovery: consume-once recovery props.
//!
//! An app that crashes may want a little state back on its next start:
//! which screen it was on, a draft, a diagnostic blob. This crate keeps that
//! value in a single durable slot.
//!
//! - [`RecoveryPropsStore`]: the slot itself. `set_recovery_props` writes,
//!   `consume_recovery_props` reads and clears in one step.
//! - [`ErrorRecovery`]: JSON layer holding the props recovered at startup and
//!   the props pending for the next run.
//! - [`RecoverySlot`]: where the value lives, optionally narrowed to one app
//!   by a scope id.
//!
//! Deciding *when* to save or consume is left to the caller.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod error_recovery;
pub mod slot;
pub mod store;

pub use error::{RecoveryError, RecoveryResult};
pub use error_recovery::ErrorRecovery;
pub use slot::{DEFAULT_KEY, DEFAULT_NAMESPACE, RecoverySlot};
pub use store::RecoveryPropsStore;
