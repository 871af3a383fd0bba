//! Command-line arguments shared by the `csv2sqlite` binaries

use crate::logging::{LogConfig, LogFormat};
use crate::source::{parse_delimiter, read_header_line, Source};
use crate::types::{parse_column_types, ConvertConfig};
use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use std::io::stdin;
use std::path::PathBuf;
use tracing::Level;

/// Input and inference options
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Field delimiter, a single character or "tab" (default: sniffed from the first line)
    #[arg(long, short = 'd')]
    pub delimiter: Option<String>,

    /// Maximum rows sampled for type inference (0 = no limit)
    #[arg(long, default_value_t = 100)]
    pub sample_size: usize,

    /// Non-null samples per column after which sampling stops early
    #[arg(long, default_value_t = 100)]
    pub sample_threshold: usize,

    /// Comma-separated column types by position: text, real or integer.
    /// Leave an entry blank (or "auto") to infer that column.
    #[arg(long, value_name = "TYPES")]
    pub types: Option<String>,

    /// Take column names from the first line of FILE; every line of the input is then data
    #[arg(long, value_name = "FILE")]
    pub headers: Option<PathBuf>,
}

impl InputArgs {
    /// Build a config from the flags, reading the external header file if given
    pub fn to_config(&self) -> Result<ConvertConfig> {
        let mut config = ConvertConfig {
            max_sample_size: self.sample_size,
            sample_threshold: self.sample_threshold,
            ..ConvertConfig::default()
        };

        if let Some(delimiter) = &self.delimiter {
            config.delimiter = Some(
                parse_delimiter(delimiter)
                    .ok_or_else(|| anyhow!("Invalid delimiter '{}': expected a single character", delimiter))?,
            );
        }

        if let Some(types) = &self.types {
            config.column_types = parse_column_types(types).context("Invalid --types list")?;
        }

        if let Some(path) = &self.headers {
            let headers = read_header_line(&Source::from_path(path), config.delimiter)
                .with_context(|| format!("Failed to read headers from {}", path.display()))?;
            config.headers = Some(headers);
        }

        Ok(config)
    }
}

/// Logging options
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Increase log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and skip the closing summary
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (compact or pretty for humans, json for machine parsing)
    #[arg(long = "log-format", value_enum, default_value = "compact")]
    pub log_format: LogFormatArg,
}

/// CLI log format choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Compact,
    Pretty,
    Json,
}

impl LogArgs {
    pub fn to_log_config(&self) -> LogConfig {
        let mut config = LogConfig::from_verbosity(self.verbose);
        if self.quiet {
            config.level = Level::ERROR;
        }
        config.with_format(match self.log_format {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        })
    }
}

/// Open the input named on the command line; `-` buffers stdin
pub fn open_input(path: &str) -> Result<Source> {
    if path == "-" {
        Source::from_reader("<stdin>", stdin().lock()).context("Failed to read stdin")
    } else {
        Ok(Source::from_path(path))
    }
}
