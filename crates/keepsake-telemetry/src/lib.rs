//! Keepsake Telemetry - log subscriber setup for the `keepsake` CLI.
//!
//! Library crates only emit `tracing` events; the binary installs one
//! subscriber here, writing to stderr, stdout or rolling files.
//!
//! # Example
//!
//! ```rust,no_run
//! use keepsake_telemetry::{FileRotation, LogConfig, LogFormat, LogSink, setup_logging};
//!
//! # fn main() -> Result<(), keepsake_telemetry::TelemetryError> {
//! let config = LogConfig::new("warn")
//!     .with_format(LogFormat::Json)
//!     .with_sink(LogSink::Files {
//!         directory: "/var/log/keepsake".into(),
//!         rotation: FileRotation::Daily,
//!     })
//!     .with_directive("keepsake_storage=debug");
//!
//! setup_logging(&config)?;
//! tracing::debug!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{FileRotation, LogConfig, LogFormat, LogSink, setup_logging};
