// src/bin/extract_local.rs
//
// Build a filing table from previously downloaded XML files.

use anyhow::{Context, Result};
use arrow::util::pretty::print_batches;
use clap::Parser;
use form990scraper::{
    extract_fields, table::io::write_parquet, Fetcher, FilingSource, FilingTable, ScraperConfig,
};
use glob::glob;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "extract_local")]
struct Args {
    /// Glob pattern of XML files, e.g. 'filings/**/*.xml'
    pattern: String,

    /// Drop incomplete rows, cast numbers and key rows by EIN_YEAR
    #[arg(long)]
    clean: bool,

    /// Write the table to this Parquet file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    let args = Args::parse();

    // local reads never touch the network
    let config = ScraperConfig::default();
    let fetcher = Fetcher::from_config(&config)?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in glob(&args.pattern).with_context(|| format!("bad pattern {}", args.pattern))? {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => warn!(error = %e, "unreadable path"),
        }
    }
    paths.sort();
    info!(files = paths.len(), "extracting");

    let rows: Vec<_> = paths
        .into_iter()
        .map(|path| extract_fields(&fetcher, &FilingSource::Local(path)))
        .collect();
    let mut table = FilingTable::from_records(&rows)?;
    if args.clean {
        table = table.clean()?;
    }
    print_batches(&[table.batch().clone()])?;

    if let Some(path) = &args.output {
        write_parquet(&table, path)?;
    }
    Ok(())
}
