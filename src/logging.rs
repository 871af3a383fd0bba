//! Logging setup for the command-line tools using `tracing-subscriber`.
//!
//! The library only emits `tracing` events; binaries call `init_logging` once
//! at startup. Output goes to stderr so stdout stays free for results.
//!
//! - `warn`: skipped rows
//! - `info`: stage progress and load summary
//! - `debug`: inference samples and resolved column types

use std::io;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line format.
    #[default]
    Compact,
    /// Human-readable multi-line format.
    Pretty,
    /// JSON lines for machine parsing.
    Json,
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::default(),
            with_ansi: true,
            with_target: false,
        }
    }
}

impl LogConfig {
    /// Map a `-v` count to a level.
    ///
    /// - 0: warn (skipped rows only)
    /// - 1: info
    /// - 2: debug
    /// - 3+: trace
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// Install the global subscriber writing to stderr.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    init_logging_with_writer(config, io::stderr)
}

/// Install the global subscriber with a custom writer.
pub fn init_logging_with_writer<W>(
    config: &LogConfig,
    writer: W,
) -> Result<(), tracing_subscriber::util::TryInitError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = build_env_filter(config.level);

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(config.with_target),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .compact()
                    .without_time()
                    .with_writer(writer)
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(writer)
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target),
            )
            .try_init(),
    }
}

/// `RUST_LOG` wins when set; otherwise this crate logs at `level` and
/// everything else at warn.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,csv2sqlite={}",
            level.as_str().to_lowercase()
        ))
    })
}
