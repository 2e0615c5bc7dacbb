//! Collect contribution figures from IRS Form 990 e-file filings published on
//! ProPublica's Nonprofit Explorer.
//!
//! - [`fetch`]: paced GET with bounded retry, and filing discovery
//! - [`extract`]: XML filing -> [`FilingRecord`] / [`ContactTable`]
//! - [`table`]: Arrow tables, cleaning, consistency check, Parquet I/O
//! - [`batch`]: many organizations at once

pub mod batch;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod table;
pub mod types;

pub use batch::{collect_contacts, run_batch, BatchOptions};
pub use config::ScraperConfig;
pub use extract::{
    extract_contacts, extract_fields, ContactRecord, ContactTable, Contribution, FilingRecord,
    FilingSource,
};
pub use fetch::{filings::locate_filings, Fetcher, Page, Transport};
pub use table::{find_inconsistent_rows, FilingTable};
pub use types::{OrgId, OrgIds};
