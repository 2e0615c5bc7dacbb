use anyhow::Result;
use arrow::util::pretty::print_batches;
use clap::Parser;
use form990scraper::{
    collect_contacts, find_inconsistent_rows, run_batch,
    table::io::{write_batch_parquet, write_parquet},
    BatchOptions, Fetcher, OrgId, ScraperConfig,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Extract Form 990 contribution figures for nonprofits from ProPublica.
#[derive(Debug, Parser)]
#[command(name = "form990scraper", version)]
struct Args {
    /// Organization EINs (digits only)
    #[arg(required = true)]
    org_ids: Vec<OrgId>,

    /// Drop incomplete rows, cast numbers and key rows by EIN_YEAR
    #[arg(long)]
    clean: bool,

    /// Log every filing URL
    #[arg(short, long)]
    verbose: bool,

    /// YAML file overriding fetch settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the filing table to this Parquet file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also collect officers and key employees into this Parquet file
    #[arg(long)]
    contacts: Option<PathBuf>,

    /// Print keys of rows whose categories do not sum to Total
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();

    // ─── 2) configure fetching ───────────────────────────────────────
    let config = match &args.config {
        Some(path) => ScraperConfig::from_yaml_file(path)?,
        None => ScraperConfig::default(),
    };
    let fetcher = Fetcher::from_config(&config)?;

    // ─── 3) filings ──────────────────────────────────────────────────
    let options = BatchOptions {
        verbose: args.verbose,
        clean: args.clean,
    };
    let table = run_batch(&fetcher, &config, args.org_ids.clone(), options)?;
    print_batches(&[table.batch().clone()])?;

    if let Some(path) = &args.output {
        write_parquet(&table, path)?;
    }

    if args.check {
        let bad = find_inconsistent_rows(&table)?;
        info!(count = bad.len(), "inconsistent rows");
        for key in bad {
            println!("{}", key);
        }
    }

    // ─── 4) contacts (separate pass) ─────────────────────────────────
    if let Some(path) = &args.contacts {
        let contacts = collect_contacts(&fetcher, &config, args.org_ids);
        write_batch_parquet(&contacts.to_record_batch()?, path)?;
    }

    info!("all done");
    Ok(())
}
