//! Subscriber setup for the keepsake CLI.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::error::{TelemetryError, TelemetryResult};

/// File name prefix of rolled log files, e.g. `keepsake.2026-10-16.log`.
const LOG_FILE_PREFIX: &str = "keepsake";

type SinkLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, for reading by eye.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
    /// One line per event with every span field.
    Full,
}

impl LogFormat {
    /// Parse a `logging.format` value. Unknown names give
    /// [`LogFormat::Compact`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "pretty" => Self::Pretty,
            "json" => Self::Json,
            "full" => Self::Full,
            _ => Self::Compact,
        }
    }
}

/// When the `file` sink starts a new file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileRotation {
    /// A new file each day.
    #[default]
    Daily,
    /// A new file each hour.
    Hourly,
    /// One file forever.
    Never,
}

impl FileRotation {
    /// Parse a `logging.rotation` value. Unknown names give
    /// [`FileRotation::Daily`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "hourly" => Self::Hourly,
            "never" => Self::Never,
            _ => Self::Daily,
        }
    }
}

impl From<FileRotation> for Rotation {
    fn from(rotation: FileRotation) -> Self {
        match rotation {
            FileRotation::Daily => Self::DAILY,
            FileRotation::Hourly => Self::HOURLY,
            FileRotation::Never => Self::NEVER,
        }
    }
}

/// Where log lines are written.
///
/// Consumed slot values go to stdout, so anything but [`LogSink::Stdout`]
/// keeps them separable from diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogSink {
    /// Standard error.
    #[default]
    Stderr,
    /// Standard output.
    Stdout,
    /// Rolling files in a directory, without colors.
    Files {
        /// Directory holding the files; created if missing.
        directory: PathBuf,
        /// Rollover period.
        rotation: FileRotation,
    },
}

/// Logging configuration for one CLI run.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base level filter, e.g. `"warn"`.
    pub level: String,
    /// Line format.
    pub format: LogFormat,
    /// Destination.
    pub sink: LogSink,
    /// Extra per-target directives, e.g. `keepsake_storage=debug`.
    pub directives: Vec<String>,
}

impl LogConfig {
    /// Compact lines on stderr at `level`.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            sink: LogSink::default(),
            directives: Vec::new(),
        }
    }

    /// Set the line format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the destination.
    #[must_use]
    pub fn with_sink(mut self, sink: LogSink) -> Self {
        self.sink = sink;
        self
    }

    /// Add a per-target directive.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    fn filter(&self) -> TelemetryResult<EnvFilter> {
        let rejected = |directive: &str, e: &dyn std::fmt::Display| TelemetryError::Filter {
            directive: directive.to_owned(),
            reason: e.to_string(),
        };
        let mut filter = EnvFilter::try_new(&self.level).map_err(|e| rejected(&self.level, &e))?;
        for directive in &self.directives {
            let parsed = directive.parse::<Directive>().map_err(|e| rejected(directive, &e))?;
            filter = filter.add_directive(parsed);
        }
        Ok(filter)
    }

    fn layer<W>(&self, writer: W, ansi: bool) -> SinkLayer
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
        match self.format {
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Full => layer.boxed(),
        }
    }

    fn sink_layer(&self) -> TelemetryResult<SinkLayer> {
        match &self.sink {
            LogSink::Stderr => Ok(self.layer(std::io::stderr, true)),
            LogSink::Stdout => Ok(self.layer(std::io::stdout, true)),
            LogSink::Files {
                directory,
                rotation,
            } => {
                let unusable = |source| TelemetryError::LogDirectory {
                    path: directory.clone(),
                    source,
                };
                std::fs::create_dir_all(directory).map_err(unusable)?;
                let appender = RollingFileAppender::builder()
                    .rotation((*rotation).into())
                    .filename_prefix(LOG_FILE_PREFIX)
                    .filename_suffix("log")
                    .build(directory)
                    .map_err(|e| TelemetryError::Install(e.to_string()))?;
                Ok(self.layer(appender, false))
            },
        }
    }
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable level or directive,
/// [`TelemetryError::LogDirectory`] if the file sink's directory cannot be
/// created, and [`TelemetryError::Install`] if a subscriber is already set.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.filter()?;
    let layer = config.sink_layer()?;
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| TelemetryError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_stdout_free() {
        let config = LogConfig::new("warn");
        assert_eq!(config.sink, LogSink::Stderr);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.directives.is_empty());
    }

    #[test]
    fn test_format_and_rotation_names() {
        assert_eq!(LogFormat::from_name("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("full"), LogFormat::Full);
        assert_eq!(LogFormat::from_name("whatever"), LogFormat::Compact);
        assert_eq!(FileRotation::from_name("hourly"), FileRotation::Hourly);
        assert_eq!(FileRotation::from_name("never"), FileRotation::Never);
        assert_eq!(FileRotation::from_name("daily"), FileRotation::Daily);
    }

    #[test]
    fn test_filter_accepts_crate_directives() {
        let config = LogConfig::new("warn").with_directive("keepsake_storage=trace");
        assert!(config.filter().is_ok());
    }

    #[test]
    fn test_filter_names_bad_directive() {
        let config = LogConfig::new("warn").with_directive("[invalid=syntax");
        match config.filter() {
            Err(TelemetryError::Filter { directive, .. }) => {
                assert_eq!(directive, "[invalid=syntax");
            },
            other => panic!("expected filter error, got {other:?}"),
        }
    }

    #[test]
    fn test_file_sink_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");
        let config = LogConfig::new("info").with_sink(LogSink::Files {
            directory: log_dir.clone(),
            rotation: FileRotation::Never,
        });
        assert!(config.sink_layer().is_ok());
        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_file_sink_reports_unusable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("plain-file");
        std::fs::write(&blocker, b"x").unwrap();
        let config = LogConfig::new("info").with_sink(LogSink::Files {
            directory: blocker.join("logs"),
            rotation: FileRotation::Daily,
        });
        assert!(matches!(
            config.sink_layer(),
            Err(TelemetryError::LogDirectory { .. })
        ));
    }
}
