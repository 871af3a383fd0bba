//! csv2sqlite-infer: Print the column types csv2sqlite would choose
//!
//! Runs only the sampling pass and writes the resulting table schema as JSON.
//!
//! Usage:
//!   # Inspect a file
//!   csv2sqlite-infer data.csv
//!
//!   # From stdin, single-line output
//!   cat data.csv | csv2sqlite-infer - --compact

use anyhow::{Context, Result};
use clap::Parser;
use csv2sqlite::cli::{open_input, InputArgs, LogArgs};
use csv2sqlite::infer_schema;
use csv2sqlite::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "csv2sqlite-infer")]
#[command(about = "Infer SQLite column types for a CSV file", long_about = None)]
struct Args {
    /// Input CSV file path (use - for stdin)
    #[arg(value_name = "CSV_FILE")]
    csv_file: String,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log.to_log_config()).context("Failed to initialize logging")?;

    let source = open_input(&args.csv_file)?;
    let config = args.input.to_config()?;

    let schema = infer_schema(&source, &config)
        .with_context(|| format!("Failed to infer column types for {}", source.name()))?;

    let output = if args.compact {
        serde_json::to_string(&schema)?
    } else {
        serde_json::to_string_pretty(&schema)?
    };

    println!("{}", output);

    Ok(())
}
