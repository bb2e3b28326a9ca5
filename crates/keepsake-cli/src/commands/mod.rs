//! CLI command handlers.

pub(crate) mod config;
pub(crate) mod props;
