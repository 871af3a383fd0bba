//! csv2sqlite: Convert a CSV file to a table in a SQLite database
//!
//! Column types (text, real, integer) are guessed from a sample of the rows.
//! The database is created if it does not yet exist; an existing table of the
//! same name is appended to.
//!
//! Usage:
//!   # Load into table "data"
//!   csv2sqlite people.csv people.sqlite
//!
//!   # Choose the table name, or derive it from the file name
//!   csv2sqlite people.csv people.sqlite staff
//!   csv2sqlite --table-from-filename exports/sales-2024.csv.gz sales.sqlite
//!
//!   # Fix some column types, infer the rest
//!   csv2sqlite --types text,,integer data.csv out.sqlite

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use csv2sqlite::cli::{open_input, InputArgs, LogArgs};
use csv2sqlite::logging::init_logging;
use csv2sqlite::sqlite::table_name_from_path;
use csv2sqlite::{convert, LoadReport, Source};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "csv2sqlite")]
#[command(about = "Convert a CSV file to a table in a SQLite database", long_about = None)]
struct Args {
    /// Input CSV file path (use - for stdin; .gz input is decompressed)
    #[arg(value_name = "CSV_FILE")]
    csv_file: String,

    /// Output SQLite file
    #[arg(value_name = "SQLITE_DB_FILE")]
    sqlite_db_file: PathBuf,

    /// Name of table to write to in SQLite file (default: data)
    #[arg(value_name = "TABLE_NAME")]
    table_name: Option<String>,

    /// Derive the table name from the input file name
    #[arg(long, conflicts_with = "table_name")]
    table_from_filename: bool,

    /// Print the load report as JSON on stdout
    #[arg(long)]
    report: bool,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log.to_log_config()).context("Failed to initialize logging")?;

    let source = open_input(&args.csv_file)?;
    let mut config = args.input.to_config()?;
    if let Some(table_name) = table_name(&args, &source) {
        config.table_name = table_name;
    }

    let report = convert(&source, &args.sqlite_db_file, &config).with_context(|| {
        format!(
            "Failed to convert {} into {}",
            source.name(),
            args.sqlite_db_file.display()
        )
    })?;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !args.log.quiet {
        print_summary(&report, &args.sqlite_db_file);
    }

    Ok(())
}

/// Explicit name first, then the input file stem when asked for
fn table_name(args: &Args, source: &Source) -> Option<String> {
    if let Some(name) = &args.table_name {
        return Some(name.clone());
    }
    match source.path() {
        Some(path) if args.table_from_filename => Some(table_name_from_path(path)),
        _ => None,
    }
}

fn print_summary(report: &LoadReport, db_path: &Path) {
    eprintln!(
        "Loaded {} of {} rows into table '{}' in {}",
        report.inserted,
        report.rows_read,
        report.table,
        db_path.display()
    );
    if !report.skipped.is_empty() {
        eprintln!("Skipped {} rows (see warnings above)", report.skipped.len());
    }
}
