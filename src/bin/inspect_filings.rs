use form990scraper::{find_inconsistent_rows, table::io::read_parquet, FilingTable};
use std::{env, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to a filing table.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <PARQUET_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Print schema, row count, index and inconsistent rows of a written table.
fn inspect(path: &Path) -> anyhow::Result<()> {
    let table = read_parquet(path)?;
    let file_size_disk = std::fs::metadata(path)?.len();

    println!("=== Filing table: {} ===", path.display());
    println!("Rows:              {}", table.num_rows());
    println!("File-size on disk: {} bytes", file_size_disk);
    println!("Index column:      {}", table.index_column().unwrap_or("<positional>"));
    println!();

    println!("=== Columns ===");
    for field in table.batch().schema().fields() {
        println!(
            "- {:<26} | {:<6} | nullable: {}",
            field.name(),
            field.data_type().to_string(),
            field.is_nullable()
        );
    }
    println!();

    print_inconsistent(&table)
}

fn print_inconsistent(table: &FilingTable) -> anyhow::Result<()> {
    let bad = find_inconsistent_rows(table)?;
    println!("=== Category sums != Total: {} row(s) ===", bad.len());
    for key in bad {
        println!("  > {}", key);
    }
    Ok(())
}
