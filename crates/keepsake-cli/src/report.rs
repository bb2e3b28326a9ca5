//! Status lines for slot commands.
//!
//! Stdout carries slot values and scope ids only; every line built here is
//! meant for stderr.

use colored::Colorize;
use keepsake_recovery::RecoverySlot;

pub(crate) fn stored(slot: &RecoverySlot, bytes: usize) -> String {
    format!("{} stored {bytes} bytes in {slot}", "✓".green())
}

pub(crate) fn cleared(slot: &RecoverySlot) -> String {
    format!("{} cleared {slot}", "✓".green())
}

pub(crate) fn swept(namespace: &str, removed: u64) -> String {
    format!("{} removed {removed} value(s) from {namespace}", "✓".green())
}

pub(crate) fn empty(slot: &RecoverySlot) -> String {
    format!("{} nothing stored in {slot}", "·".dimmed())
}

pub(crate) fn no_scopes(slot: &RecoverySlot) -> String {
    format!(
        "{} no scoped props under {}/{}",
        "·".dimmed(),
        slot.namespace(),
        slot.base_key()
    )
}

/// The substrate refused `action` on `slot`; details are in the log.
pub(crate) fn refused(action: &str, slot: &RecoverySlot) -> String {
    format!("{} could not {action} {}", "✗".red(), slot.to_string().red())
}

/// A problem found while loading config, before logging was available.
pub(crate) fn config_warning(message: &str) -> String {
    format!("{} {message}", "!".yellow().bold())
}
